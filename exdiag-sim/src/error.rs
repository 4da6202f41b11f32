//! Error types for operators and the apply kernel

use exdiag_core::CoreError;
use exdiag_state::StateError;
use exdiag_symmetry::SymmetryError;
use thiserror::Error;

/// Result type for operator operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building operators or applying them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Row or column range outside the representation
    #[error("Range {start}..{end} out of bounds for dimension {dimension}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        dimension: usize,
    },

    /// Basis index outside the representation
    #[error("Index {index} out of bounds for dimension {dimension}")]
    IndexOutOfBounds { index: usize, dimension: usize },

    /// Vector length does not match the representation
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Row or column pattern has bits outside the mask
    #[error("Pure operator pattern {pattern:#b} is not contained in mask {bitmask:#b}")]
    PatternOutsideMask { bitmask: u128, pattern: u128 },

    /// Dedicated worker pool could not be created
    #[error("Failed to build thread pool: {reason}")]
    ThreadPool { reason: String },

    /// Hilbert space error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Representation error
    #[error(transparent)]
    State(#[from] StateError),

    /// Symmetry error
    #[error(transparent)]
    Symmetry(#[from] SymmetryError),
}

impl From<rayon::ThreadPoolBuildError> for SimError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        SimError::ThreadPool {
            reason: err.to_string(),
        }
    }
}
