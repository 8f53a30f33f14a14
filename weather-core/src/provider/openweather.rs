use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::{GeocodeError, ProviderError},
    location::{GeocodeMatch, Geocoder},
    model::{Coordinate, CurrentConditions, ForecastEntry, ForecastSet, Units},
};

use super::{WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// OpenWeather REST client: direct geocoding, current weather and forecast.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    geo_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_urls(api_key, DEFAULT_BASE_URL, DEFAULT_GEO_URL)
    }

    pub fn with_urls(api_key: String, base_url: &str, geo_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            geo_url: geo_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Build a client from the stored configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set WEATHER_API_KEY."
            )
        })?;

        Ok(Self::with_urls(api_key, config.base_url(), config.geo_url()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        tracing::debug!(url, "OpenWeather request");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_weather<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        at: Coordinate,
        units: Units,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        self.get_json(&url, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", units.as_str())])
            .await
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        let url = format!("{}/direct", self.geo_url);
        let matches: Vec<OwGeoMatch> = self.get_json(&url, &[("q", city), ("limit", "1")]).await?;

        Ok(matches
            .into_iter()
            .map(|m| GeocodeMatch {
                coordinate: Coordinate::new(m.lat, m.lon),
                name: m.name,
                country: m.country,
            })
            .collect())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(
        &self,
        at: Coordinate,
        units: Units,
    ) -> Result<CurrentConditions, ProviderError> {
        let parsed: OwCurrentResponse = self.get_weather("weather", at, units).await?;

        Ok(CurrentConditions {
            location_name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
        })
    }

    async fn forecast(&self, at: Coordinate, units: Units) -> Result<ForecastSet, ProviderError> {
        let parsed: OwForecastResponse = self.get_weather("forecast", at, units).await?;

        Ok(ForecastSet {
            city_name: parsed.city.name,
            entries: parsed
                .list
                .into_iter()
                .map(|e| ForecastEntry::new(e.dt_txt, e.main.temp))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = OpenWeatherClient::with_urls("KEY".into(), "http://a/data/", "http://b/geo/");
        assert_eq!(client.base_url, "http://a/data");
        assert_eq!(client.geo_url, "http://b/geo");
    }

    #[test]
    fn from_config_errors_without_api_key() {
        let cfg = Config::default();
        let err = OpenWeatherClient::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn forecast_payload_maps_dt_txt_and_temp() {
        let body = r#"{
            "city": {"name": "Helsinki", "country": "FI"},
            "list": [
                {"dt": 1, "dt_txt": "2024-01-01 00:00:00", "main": {"temp": -3.2, "humidity": 80}},
                {"dt": 2, "dt_txt": "2024-01-01 03:00:00", "main": {"temp": -4.0}}
            ]
        }"#;
        let parsed: OwForecastResponse = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.city.name, "Helsinki");
        assert_eq!(parsed.list.len(), 2);
        assert_eq!(parsed.list[1].dt_txt, "2024-01-01 03:00:00");
        assert_eq!(parsed.list[1].main.temp, -4.0);
    }
}
