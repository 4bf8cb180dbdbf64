//! Collaborator seams for the route planner.
//!
//! These are intentionally minimal and transport-agnostic. Concrete
//! adapters (HTTP clients, offline estimators) implement them for real
//! services.

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A longitude/latitude pair as produced by the address resolver.
///
/// Longitude first, matching the GeoJSON convention used by the
/// geocoding service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Resolves a free-text place description to geographic coordinates.
pub trait GeocodeProvider {
    fn resolve(&self, place: &str) -> Result<Coordinate, LookupError>;
}

/// Measures real-world travel distance between two coordinates, in
/// kilometers.
pub trait DistanceProvider {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, LookupError>;
}
