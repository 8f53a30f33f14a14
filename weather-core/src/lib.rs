//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Location resolution (city geocoding or device position)
//! - Concurrent fetching of current conditions and the 5-day forecast
//! - Grouping of forecast entries into day buckets
//! - A session object holding the last good result for a presentation layer
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod bucket;
pub mod config;
pub mod device;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod session;

pub use aggregator::WeatherAggregator;
pub use bucket::{DayBucket, DayBucketMap, bucket_by_day};
pub use config::Config;
pub use device::{PermissionPolicy, PermissionPrompt};
pub use error::{FetchCycleError, LocationError, ProviderError, WeatherFetchError};
pub use location::{Geocoder, LocationResolver, PositionService};
pub use model::{Coordinate, CurrentConditions, ForecastEntry, ForecastSet, Units, WeatherReport};
pub use provider::{OpenWeatherClient, WeatherProvider};
pub use session::{CycleOutcome, WeatherSession, fetch_cycle};
