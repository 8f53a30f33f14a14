//! Presentation state for one screen of weather, updated only through fetch cycles.

use crate::{
    aggregator::WeatherAggregator,
    bucket::{DayBucketMap, bucket_by_day},
    error::FetchCycleError,
    location::LocationResolver,
    model::{Units, WeatherReport},
};

/// Handle for one in-flight fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CycleTicket(u64);

impl CycleTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Report replaced, error cleared.
    Updated,
    /// Error recorded, previous report kept.
    Failed,
    /// A newer cycle was started after this one; nothing changed.
    Stale,
}

/// Last known good report plus the transient state a UI shows around it.
///
/// Overlapping cycles are tagged with a monotonic sequence number and only the
/// most recently started one may apply its result.
#[derive(Debug, Default)]
pub struct WeatherSession {
    report: Option<WeatherReport>,
    error: Option<String>,
    loading: bool,
    expanded_day: Option<String>,
    issued: u64,
}

impl WeatherSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn expanded_day(&self) -> Option<&str> {
        self.expanded_day.as_deref()
    }

    /// Expand `day`, or collapse it when it is already expanded.
    pub fn toggle_day(&mut self, day: &str) {
        if self.expanded_day.as_deref() == Some(day) {
            self.expanded_day = None;
        } else {
            self.expanded_day = Some(day.to_string());
        }
    }

    /// Forecast of the current report grouped by day, empty before the first success.
    pub fn day_buckets(&self) -> DayBucketMap {
        self.report.as_ref().map(|r| bucket_by_day(&r.forecast)).unwrap_or_default()
    }

    pub fn begin_cycle(&mut self) -> CycleTicket {
        self.issued += 1;
        self.loading = true;
        CycleTicket(self.issued)
    }

    pub fn complete(
        &mut self,
        ticket: CycleTicket,
        result: Result<WeatherReport, FetchCycleError>,
    ) -> CycleOutcome {
        if ticket.0 != self.issued {
            tracing::warn!(
                cycle = ticket.0,
                latest = self.issued,
                "Discarding result of superseded fetch cycle"
            );
            return CycleOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
                CycleOutcome::Updated
            }
            Err(err) => {
                tracing::warn!(cycle = ticket.0, error = %err, "Fetch cycle failed");
                self.error = Some(err.to_string());
                CycleOutcome::Failed
            }
        }
    }

    /// Resolve `city` (or the device position), fetch, and apply the result.
    pub async fn run_cycle(
        &mut self,
        resolver: &LocationResolver,
        aggregator: &WeatherAggregator,
        city: Option<&str>,
        units: Units,
    ) -> CycleOutcome {
        let ticket = self.begin_cycle();
        let result = fetch_cycle(resolver, aggregator, city, units).await;
        self.complete(ticket, result)
    }
}

/// One resolve-then-fetch attempt, independent of any session.
pub async fn fetch_cycle(
    resolver: &LocationResolver,
    aggregator: &WeatherAggregator,
    city: Option<&str>,
    units: Units,
) -> Result<WeatherReport, FetchCycleError> {
    let at = resolver.resolve(city).await?;
    Ok(aggregator.fetch(at, units).await?)
}
