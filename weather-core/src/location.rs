//! Turning a city name, or the device's position, into a coordinate.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{GeocodeError, LocationError, PositionError},
    model::Coordinate,
};

/// One hit from a direct geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    pub name: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Look up `city`, best match first. An empty list means no match.
    async fn geocode(&self, city: &str) -> Result<Vec<GeocodeMatch>, GeocodeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Permission-gated source of the device's current position.
#[async_trait]
pub trait PositionService: Send + Sync + Debug {
    /// Asked on every resolution; implementations must not cache the answer.
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> Result<Coordinate, PositionError>;
}

#[derive(Debug)]
pub struct LocationResolver {
    geocoder: Box<dyn Geocoder>,
    position: Box<dyn PositionService>,
}

impl LocationResolver {
    pub fn new(geocoder: Box<dyn Geocoder>, position: Box<dyn PositionService>) -> Self {
        Self { geocoder, position }
    }

    /// Resolve `city` by geocoding, or the device position when it is absent or blank.
    ///
    /// The city is trimmed first; a whitespace-only name is treated like no name and
    /// goes to the device position, it is never sent to the geocoder.
    ///
    /// Single attempt, no retries. A failure on one path never falls back to the other.
    pub async fn resolve(&self, city: Option<&str>) -> Result<Coordinate, LocationError> {
        match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => self.resolve_city(city).await,
            None => self.resolve_device().await,
        }
    }

    async fn resolve_city(&self, city: &str) -> Result<Coordinate, LocationError> {
        let matches = self
            .geocoder
            .geocode(city)
            .await
            .map_err(LocationError::GeocodingFailed)?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::CityNotFound(city.to_string()))?;

        tracing::info!(
            city,
            matched = first.name.as_deref().unwrap_or(city),
            coordinate = %first.coordinate,
            "Geocoded city"
        );
        Ok(first.coordinate)
    }

    async fn resolve_device(&self) -> Result<Coordinate, LocationError> {
        if self.position.request_permission().await == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied);
        }

        let coordinate = self
            .position
            .current_position()
            .await
            .map_err(LocationError::PositionUnavailable)?;

        tracing::info!(coordinate = %coordinate, "Resolved device position");
        Ok(coordinate)
    }
}
