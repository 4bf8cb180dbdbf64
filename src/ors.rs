//! OpenRouteService HTTP adapter for geocoding and driving distances.

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::traits::{Coordinate, DistanceProvider, GeocodeProvider};

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            profile: "driving-car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OrsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl GeocodeProvider for OrsClient {
    fn resolve(&self, place: &str) -> Result<Coordinate, LookupError> {
        let url = format!("{}/geocode/search", self.config.base_url);
        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("text", place),
                ("size", "1"),
            ])
            .send()?
            .error_for_status()?
            .json::<GeocodeResponse>()?;

        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NoMatch {
                place: place.to_string(),
            })?;

        match feature.geometry.coordinates.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lon, *lat)),
            _ => Err(LookupError::NoMatch {
                place: place.to_string(),
            }),
        }
    }
}

impl DistanceProvider for OrsClient {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, LookupError> {
        let url = format!(
            "{}/v2/directions/{}",
            self.config.base_url, self.config.profile
        );
        let body = DirectionsRequest {
            coordinates: vec![[from.lon, from.lat], [to.lon, to.lat]],
        };

        let response = self
            .client
            .post(url)
            .header("Authorization", self.config.api_key.as_str())
            .json(&body)
            .send()?
            .error_for_status()?
            .json::<DirectionsResponse>()?;

        let meters = response
            .routes
            .into_iter()
            .next()
            .ok_or(LookupError::EmptyResponse)?
            .summary
            .distance;

        Ok(meters_to_km(meters))
    }
}

/// Meters to kilometers, rounded to two decimals.
fn meters_to_km(meters: f64) -> f64 {
    (meters / 1000.0 * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    summary: DirectionsSummary,
}

#[derive(Debug, Deserialize)]
struct DirectionsSummary {
    distance: f64,
}
