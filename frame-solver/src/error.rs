//! Error types for the frame and beam solvers

use thiserror::Error;

/// Main error type for solver operations
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Node {0} not found in model")]
    NodeNotFound(usize),

    #[error("Duplicate node id {0}")]
    DuplicateNode(usize),

    #[error("Singular stiffness matrix - model may be unstable or have insufficient reactions")]
    SingularMatrix,

    #[error("Mass matrix is not positive definite - every free DOF needs mass for modal analysis")]
    IndefiniteMass,

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Convergence failed after {0} iterations")]
    ConvergenceFailed(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for solver operations
pub type FEAResult<T> = Result<T, FEAError>;
