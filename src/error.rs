use thiserror::Error;

/// Top-level error type for the seamline pattern kernel.
#[derive(Debug, Error)]
pub enum SeamlineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("subdivision fractions must lie in (0, 1] and sum to 1, got sum {sum}")]
    InvalidFractions { sum: f64 },

    #[error("curves with {0} control points are not supported")]
    UnsupportedDegree(usize),
}

/// Errors related to the vertex / edge / panel graph.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("panel {panel} has not been assembled yet, geometric ids are unknown")]
    NotAssembled { panel: String },
}

/// Errors related to pattern construction operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("offset {offset} is out of the admissible range [{min}, {max}]")]
    OffsetOutOfBounds { offset: f64, min: f64, max: f64 },

    #[error("shape fitting failed, residual {residual:e}")]
    FitFailed { residual: f64 },

    #[error("interface projection consumed {consumed} of {expected} target fractions")]
    ProjectionMismatch { consumed: usize, expected: usize },

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised when reading design parameters.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("design parameter '{0}' not found")]
    Missing(String),

    #[error("design parameter '{path}' is not a {expected}")]
    Mistyped { path: String, expected: &'static str },
}

/// Convenience type alias for results using [`SeamlineError`].
pub type Result<T> = std::result::Result<T, SeamlineError>;
