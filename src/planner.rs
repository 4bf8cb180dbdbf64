//! End-to-end planning facade.
//!
//! Ties the matrix builder, graph, and optimizer together behind the
//! interface a presentation layer consumes. Each call owns its working
//! set; nothing is shared across planning requests.

use serde::Serialize;
use tracing::debug;

use crate::error::SolveError;
use crate::graph::RouteGraph;
use crate::matrix::{DistanceMatrix, DistanceMatrixBuilder};
use crate::solver::{SolveOptions, find_best_route};
use crate::traits::{DistanceProvider, GeocodeProvider};

/// A planned visiting order with its total driving distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    /// Every requested location exactly once, starting at the source.
    pub route: Vec<String>,
    pub total_distance_km: f64,
}

/// Plans delivery routes using the injected geocoding and distance
/// providers.
#[derive(Debug, Clone)]
pub struct RoutePlanner<G, D> {
    geocoder: G,
    distances: D,
    options: SolveOptions,
}

impl<G, D> RoutePlanner<G, D>
where
    G: GeocodeProvider + Sync,
    D: DistanceProvider + Sync,
{
    pub fn new(geocoder: G, distances: D) -> Self {
        Self::with_options(geocoder, distances, SolveOptions::default())
    }

    pub fn with_options(geocoder: G, distances: D, options: SolveOptions) -> Self {
        Self {
            geocoder,
            distances,
            options,
        }
    }

    /// Fetch the pairwise distance matrix, for display before committing
    /// to optimization.
    pub fn distance_matrix(&self, locations: &[String]) -> DistanceMatrix {
        DistanceMatrixBuilder::new(&self.geocoder, &self.distances).build(locations)
    }

    /// Full pipeline: resolve addresses, measure distances, build the
    /// graph, and find the best visiting order from `source`.
    pub fn plan(&self, locations: &[String], source: &str) -> Result<RoutePlan, SolveError> {
        let matrix = self.distance_matrix(locations);
        self.plan_from_matrix(locations, &matrix, source)
    }

    /// Optimize over a matrix obtained earlier from
    /// [`distance_matrix`](Self::distance_matrix), without re-querying the
    /// providers.
    pub fn plan_from_matrix(
        &self,
        locations: &[String],
        matrix: &DistanceMatrix,
        source: &str,
    ) -> Result<RoutePlan, SolveError> {
        if matrix.is_empty() {
            return Err(SolveError::NoFeasibleRoute);
        }

        let graph = RouteGraph::from_parts(locations, &matrix.edges);
        let solved = find_best_route(&graph, source, &self.options)?;
        debug!(
            stops = solved.route.len(),
            total_km = solved.total_km,
            "route planned"
        );

        Ok(RoutePlan {
            route: solved.route,
            total_distance_km: solved.total_km,
        })
    }
}
