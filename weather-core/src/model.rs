use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Unit system understood by the OpenWeather `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// Snapshot of the current-conditions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed: f64,
}

/// One 3-hour step of the forecast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Provider-local timestamp, `yyyy-MM-dd HH:mm:ss`.
    pub timestamp: String,
    pub temperature: f64,
}

impl ForecastEntry {
    pub fn new(timestamp: impl Into<String>, temperature: f64) -> Self {
        Self { timestamp: timestamp.into(), temperature }
    }

    /// Calendar day of this entry, taken verbatim from the timestamp.
    ///
    /// No timezone conversion happens here: the provider reports `dt_txt`
    /// in its own convention and entries near midnight are grouped by that
    /// string, not by the caller's local date.
    pub fn day_key(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }

    /// Time-of-day portion (`HH:mm`) when the timestamp has one.
    pub fn time_of_day(&self) -> Option<&str> {
        self.timestamp.get(11..16)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    pub city_name: String,
    pub entries: Vec<ForecastEntry>,
}

/// Current conditions and forecast from one fetch cycle. Always replaced as a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: ForecastSet,
    pub units: Units,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvinish").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn day_key_is_date_prefix() {
        let entry = ForecastEntry::new("2024-01-01 21:00:00", 3.5);
        assert_eq!(entry.day_key(), "2024-01-01");
        assert_eq!(entry.time_of_day(), Some("21:00"));
    }

    #[test]
    fn day_key_of_short_timestamp_is_whole_string() {
        let entry = ForecastEntry::new("2024-01", 3.5);
        assert_eq!(entry.day_key(), "2024-01");
        assert_eq!(entry.time_of_day(), None);
    }
}
