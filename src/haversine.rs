//! Great-circle distance provider (fallback when no routing service is
//! available).
//!
//! Straight-line distance ignores roads, so estimates run short of real
//! driving distance, but it needs no network access or API key.

use crate::error::LookupError;
use crate::traits::{Coordinate, DistanceProvider};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based distance provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistance;

impl HaversineDistance {
    pub fn new() -> Self {
        Self
    }

    /// Great-circle distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lon = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

impl DistanceProvider for HaversineDistance {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, LookupError> {
        Ok(Self::haversine_km(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate::new(-115.1, 36.1);
        let dist = HaversineDistance::haversine_km(point, point);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Las Vegas (36.17, -115.14) to Los Angeles (34.05, -118.24)
        // Actual distance ~370 km
        let vegas = Coordinate::new(-115.14, 36.17);
        let la = Coordinate::new(-118.24, 34.05);
        let dist = HaversineDistance::haversine_km(vegas, la);
        assert!(dist > 350.0 && dist < 400.0, "LV to LA should be ~370km, got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Coordinate::new(-115.1, 36.1);
        let b = Coordinate::new(-115.2, 36.2);
        let forward = HaversineDistance::haversine_km(a, b);
        let backward = HaversineDistance::haversine_km(b, a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_provider_never_fails() {
        let a = Coordinate::new(75.65, 32.27);
        let b = Coordinate::new(74.87, 31.63);
        let dist = HaversineDistance::new().distance_km(a, b).unwrap();
        assert!(dist > 0.0 && dist.is_finite());
    }
}
