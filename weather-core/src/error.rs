use reqwest::StatusCode;

/// Failure talking to an HTTP endpoint of the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Geocoding shares the provider's HTTP failure modes.
pub type GeocodeError = ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("position lookup failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("position lookup failed: {0}")]
    Lookup(String),

    #[error("no device position configured")]
    NotConfigured,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Geocoding error: Entered city not found ({0})")]
    CityNotFound(String),

    #[error("Geocoding error: {0}")]
    GeocodingFailed(#[source] GeocodeError),

    #[error("Device location permission not granted. Enter a city name for weather data.")]
    PermissionDenied,

    #[error("Device location unavailable: {0}")]
    PositionUnavailable(#[source] PositionError),
}

/// Which half of the current/forecast pair failed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Current,
    Forecast,
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchKind::Current => f.write_str("current weather"),
            FetchKind::Forecast => f.write_str("forecast"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("API error ({kind}): {source}")]
pub struct WeatherFetchError {
    pub kind: FetchKind,
    #[source]
    pub source: ProviderError,
}

impl WeatherFetchError {
    pub fn current(source: ProviderError) -> Self {
        Self { kind: FetchKind::Current, source }
    }

    pub fn forecast(source: ProviderError) -> Self {
        Self { kind: FetchKind::Forecast, source }
    }
}

/// Any failure that ends a resolve-then-fetch cycle.
#[derive(Debug, thiserror::Error)]
pub enum FetchCycleError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Weather(#[from] WeatherFetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_message_hints_at_city() {
        let msg = LocationError::PermissionDenied.to_string();
        assert!(msg.contains("Enter a city name"));
    }

    #[test]
    fn fetch_error_names_the_failed_half() {
        let err = WeatherFetchError::forecast(ProviderError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".into(),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("API error (forecast)"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn cycle_error_is_transparent() {
        let err: FetchCycleError = LocationError::CityNotFound("Nowhereville".into()).into();
        assert!(err.to_string().contains("Entered city not found"));
    }
}
