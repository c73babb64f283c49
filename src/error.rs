//! Error types for shape construction, configuration and stepping.

use thiserror::Error;

/// Rejected shape geometry. Raised at construction so malformed shapes never
/// reach the solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("circle radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon has zero area")]
    DegeneratePolygon,
    #[error("polygon is not convex")]
    NonConvexPolygon,
    #[error("line segment has zero length")]
    DegenerateSegment,
    #[error("extents must be finite and positive, got ({0}, {1})")]
    InvalidExtents(f64, f64),
    #[error("vertex or parameter is not finite")]
    NonFinite,
}

/// Errors produced while loading or validating a `WorldConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors surfaced by the physics world.
#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("time step must be finite, got {0}")]
    InvalidTimeStep(f64),
    #[error("ray direction must be non-zero")]
    DegenerateRay,
    #[error("body {0} has non-finite state after integration")]
    NonFiniteState(u32),
}
