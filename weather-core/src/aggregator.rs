use chrono::Utc;

use crate::{
    bucket::{DayBucketMap, bucket_by_day},
    error::WeatherFetchError,
    model::{Coordinate, ForecastSet, Units, WeatherReport},
    provider::WeatherProvider,
};

/// Fetches current conditions and forecast for a coordinate as one unit.
#[derive(Debug)]
pub struct WeatherAggregator {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherAggregator {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Issue both requests concurrently and return them as a pair.
    ///
    /// The first failure wins; whatever the other request produced is dropped.
    pub async fn fetch(
        &self,
        at: Coordinate,
        units: Units,
    ) -> Result<WeatherReport, WeatherFetchError> {
        let current = async {
            self.provider.current(at, units).await.map_err(WeatherFetchError::current)
        };
        let forecast = async {
            self.provider.forecast(at, units).await.map_err(WeatherFetchError::forecast)
        };

        let (current, forecast) = tokio::try_join!(current, forecast).inspect_err(|err| {
            tracing::warn!(coordinate = %at, error = %err, "Weather fetch failed");
        })?;

        tracing::info!(
            coordinate = %at,
            location = %current.location_name,
            entries = forecast.entries.len(),
            "Fetched weather"
        );

        Ok(WeatherReport { current, forecast, units, fetched_at: Utc::now() })
    }

    /// See [`bucket_by_day`].
    pub fn bucket_by_day(forecast: &ForecastSet) -> DayBucketMap {
        bucket_by_day(forecast)
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::error::FetchKind;
    use std::{sync::atomic::Ordering, time::Duration};

    const AT: Coordinate = Coordinate { latitude: 60.17, longitude: 24.94 };

    #[tokio::test]
    async fn fetch_returns_both_halves() {
        let aggregator = WeatherAggregator::new(Box::new(FakeProvider::ok("Helsinki")));

        let report = aggregator.fetch(AT, Units::Imperial).await.unwrap();
        assert_eq!(report.current.location_name, "Helsinki");
        assert_eq!(report.forecast.entries.len(), 3);
        assert_eq!(report.units, Units::Imperial);
    }

    #[tokio::test]
    async fn forecast_failure_fails_the_whole_fetch() {
        let provider = FakeProvider { forecast_fails: true, ..FakeProvider::ok("Helsinki") };
        let current_calls = provider.current_calls.clone();
        let aggregator = WeatherAggregator::new(Box::new(provider));

        let err = aggregator.fetch(AT, Units::Metric).await.unwrap_err();
        assert_eq!(err.kind, FetchKind::Forecast);
        assert_eq!(current_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn current_failure_fails_the_whole_fetch() {
        let provider = FakeProvider { current_fails: true, ..FakeProvider::ok("Helsinki") };
        let aggregator = WeatherAggregator::new(Box::new(provider));

        let err = aggregator.fetch(AT, Units::Metric).await.unwrap_err();
        assert_eq!(err.kind, FetchKind::Current);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_issued_concurrently() {
        let provider = FakeProvider { delay: Duration::from_secs(5), ..FakeProvider::ok("Oslo") };
        let aggregator = WeatherAggregator::new(Box::new(provider));

        let started = tokio::time::Instant::now();
        aggregator.fetch(AT, Units::Metric).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn bucket_by_day_is_exposed_on_the_aggregator() {
        let buckets = WeatherAggregator::bucket_by_day(&forecast("Oslo"));
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets.get("2024-01-01").map(|b| b.avg_temp), Some(15.0));
    }
}
