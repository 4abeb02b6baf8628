//! Error types for frame assembly and transport analysis

use frame_solver::error::FEAError;
use thiserror::Error;

/// Main error type for the turbine structures core
#[derive(Error, Debug)]
pub enum StructuresError {
    #[error("{what} count {count} exceeds capacity {max}")]
    CapacityExceeded {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("Geometry lookup failed: {0}")]
    GeometryLookup(String),

    #[error("Non-finite result: {0}")]
    NonFinite(String),

    #[error("The optimization cannot satisfy the constraint on {constraint}: {message}")]
    OptimizationDidNotConverge { constraint: String, message: String },

    #[error("Only straight blades are supported, found {axis} offset {value} at station {station}")]
    NonStraightBlade {
        axis: char,
        station: usize,
        value: f64,
    },

    #[error("Element {element} of member {member} collapses onto a single node")]
    DegenerateElement { member: usize, element: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Solver(#[from] FEAError),
}

/// Result type for the turbine structures core
pub type StructuresResult<T> = Result<T, StructuresError>;
