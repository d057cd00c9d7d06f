use thiserror::Error;

/// Top-level error type for the polycarve kernel.
#[derive(Debug, Error)]
pub enum PolycarveError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the indexed mesh topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("polygon boundary loop is not closed")]
    OpenBoundaryLoop,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to clipping and construction operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`PolycarveError`].
pub type Result<T> = std::result::Result<T, PolycarveError>;
