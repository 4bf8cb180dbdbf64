//! Error taxonomy for route planning.

use thiserror::Error;

/// Failure from an external lookup (geocoding or distance measurement).
#[derive(Debug, Error)]
pub enum LookupError {
    /// The resolver returned no match for the place text.
    #[error("no coordinates found for '{place}'")]
    NoMatch { place: String },

    /// The provider responded but carried no usable route.
    #[error("response carried no route between the coordinates")]
    EmptyResponse,

    /// Transport-level failure, including timeouts.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Non-fatal event recorded while building a distance matrix.
///
/// Diagnostics accumulate alongside the measured edges; they never abort
/// the build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixDiagnostic {
    /// A location could not be geocoded; it stays in the graph as an
    /// isolated node.
    #[error("skipped '{place}': {reason}")]
    ResolutionFailed { place: String, reason: String },

    /// A distance lookup between two resolved locations failed; only that
    /// pair is omitted.
    #[error("skipped pair '{from}' <-> '{to}': {reason}")]
    MeasurementFailed {
        from: String,
        to: String,
        reason: String,
    },
}

/// Fatal planning failure. There is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// No full-length route exists from the requested source.
    #[error("no feasible route visiting every location from the source")]
    NoFeasibleRoute,

    /// The optimizer produced a route that traverses a nonexistent edge.
    /// Indicates a heuristic/graph mismatch; never silently repaired.
    #[error("optimizer produced a route over a missing edge '{from}' -> '{to}'")]
    MissingEdge { from: String, to: String },

    /// The computation was aborted through its cancel token.
    #[error("route computation cancelled")]
    Cancelled,
}
