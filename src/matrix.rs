//! Pairwise distance matrix construction from external services.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::error::MatrixDiagnostic;
use crate::traits::{Coordinate, DistanceProvider, GeocodeProvider};

/// A measured travel distance between two named locations.
///
/// The pair is unordered; builders emit each pair once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceEdge {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
}

/// Every pairwise distance that could be measured, plus a record of what
/// was skipped and why.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    pub edges: Vec<DistanceEdge>,
    pub diagnostics: Vec<MatrixDiagnostic>,
}

impl DistanceMatrix {
    /// An empty matrix means nothing could be measured; callers should
    /// treat it as "cannot plan".
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Builds a [`DistanceMatrix`] by querying the configured providers.
///
/// Resolution and measurement calls fan out on the rayon thread pool;
/// aggregation is order-independent, so the parallelism never affects the
/// result.
pub struct DistanceMatrixBuilder<'a, G, D> {
    geocoder: &'a G,
    distances: &'a D,
}

impl<'a, G, D> DistanceMatrixBuilder<'a, G, D>
where
    G: GeocodeProvider + Sync,
    D: DistanceProvider + Sync,
{
    pub fn new(geocoder: &'a G, distances: &'a D) -> Self {
        Self { geocoder, distances }
    }

    /// Resolve every distinct location once, then measure every unordered
    /// pair of resolved locations. Failed lookups become diagnostics, not
    /// errors; a failure never aborts the build.
    pub fn build(&self, locations: &[String]) -> DistanceMatrix {
        let unique = dedupe(locations);

        let resolutions: Vec<_> = unique
            .par_iter()
            .map(|place| (place, self.geocoder.resolve(place)))
            .collect();

        let mut coords: HashMap<&str, Coordinate> = HashMap::new();
        let mut diagnostics = Vec::new();
        for (place, resolution) in resolutions {
            match resolution {
                Ok(coord) => {
                    coords.insert(place.as_str(), coord);
                }
                Err(err) => {
                    warn!(place = %place, error = %err, "skipping unresolvable location");
                    diagnostics.push(MatrixDiagnostic::ResolutionFailed {
                        place: place.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut pairs = Vec::new();
        for (i, from) in unique.iter().enumerate() {
            for to in unique.iter().skip(i + 1) {
                if let (Some(&a), Some(&b)) = (coords.get(from.as_str()), coords.get(to.as_str())) {
                    pairs.push((from, to, a, b));
                }
            }
        }

        let measurements: Vec<_> = pairs
            .par_iter()
            .map(|(from, to, a, b)| (*from, *to, self.distances.distance_km(*a, *b)))
            .collect();

        let mut edges = Vec::new();
        for (from, to, measurement) in measurements {
            match measurement {
                Ok(distance_km) => edges.push(DistanceEdge {
                    from: from.clone(),
                    to: to.clone(),
                    distance_km,
                }),
                Err(err) => {
                    warn!(from = %from, to = %to, error = %err, "skipping unmeasurable pair");
                    diagnostics.push(MatrixDiagnostic::MeasurementFailed {
                        from: from.clone(),
                        to: to.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        DistanceMatrix { edges, diagnostics }
    }
}

/// Distinct locations in first-seen order.
fn dedupe(locations: &[String]) -> Vec<String> {
    let mut seen = HashMap::new();
    let mut unique = Vec::new();
    for location in locations {
        if seen.insert(location.as_str(), ()).is_none() {
            unique.push(location.clone());
        }
    }
    unique
}
