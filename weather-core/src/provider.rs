use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::ProviderError,
    model::{Coordinate, CurrentConditions, ForecastSet, Units},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current conditions and the 5-day/3-hour forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(
        &self,
        at: Coordinate,
        units: Units,
    ) -> Result<CurrentConditions, ProviderError>;

    async fn forecast(&self, at: Coordinate, units: Units) -> Result<ForecastSet, ProviderError>;
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_kept() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn long_body_is_cut() {
        let body = "x".repeat(500);
        let cut = truncate_body(&body);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let body = format!("{}{}", "a".repeat(199), "é".repeat(10));
        let cut = truncate_body(&body);
        assert!(cut.starts_with(&"a".repeat(199)));
        assert!(cut.ends_with("..."));
    }
}
