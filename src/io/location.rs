//! One-shot geolocation queries

use crate::domain::types::GeoPoint;
use async_trait::async_trait;
use thiserror::Error;

/// Ways a single-shot location query can fail; all are recoverable,
/// the caller substitutes a placeholder and continues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The platform has no geolocation capability
    #[error("geolocation is not supported on this platform")]
    Unavailable,
    /// The user or platform denied the query
    #[error("geolocation permission denied")]
    Denied,
    /// The query did not resolve within its time bound
    #[error("geolocation query timed out")]
    Timeout,
}

/// Single-shot asynchronous location query; no streaming
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn resolve(&self) -> Result<GeoPoint, LocationError>;
}

/// Provider returning a fixed coordinate, for hosts that pin their position
/// (configured kiosks, tests)
pub struct FixedLocation {
    point: GeoPoint,
}

impl FixedLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { point: GeoPoint { lat, lng } }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn resolve(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.point)
    }
}

/// Provider for hosts with no geolocation capability at all
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn resolve(&self) -> Result<GeoPoint, LocationError> {
        Err(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location_resolves() {
        let provider = FixedLocation::new(12.9716, 77.5946);
        let point = provider.resolve().await.unwrap();
        assert_eq!(point.lat, 12.9716);
        assert_eq!(point.lng, 77.5946);
    }

    #[tokio::test]
    async fn test_no_location_fails_unavailable() {
        assert_eq!(NoLocation.resolve().await, Err(LocationError::Unavailable));
    }
}
