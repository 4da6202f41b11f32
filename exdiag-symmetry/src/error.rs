//! Error types for permutations, groups and symmetry reduction

use thiserror::Error;

/// Errors raised while building symmetry groups or reducing representations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymmetryError {
    /// Image array is not a bijection on `0..n`
    #[error("Not a permutation of 0..{}: {map:?}", .map.len())]
    InvalidPermutation { map: Vec<usize> },

    /// Cycle length exceeds the configured bound
    #[error("Permutation cycle length exceeds the maximum of {max_cycle}")]
    CycleTooLong { max_cycle: usize },

    /// Operands of different sizes
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A group needs at least one generator
    #[error("Symmetry group needs at least one generator")]
    NoGenerators,

    /// Declared order does not bring the generator back to the identity
    #[error("Generator {generator} does not have order dividing {order}")]
    InvalidOrder { generator: usize, order: usize },

    /// Translation generators must commute
    #[error("Generators {first} and {second} do not commute")]
    NonCommutingGenerators { first: usize, second: usize },

    /// One momentum component per generator is required
    #[error("Expected {expected} momentum components, got {actual}")]
    MomentumLengthMismatch { expected: usize, actual: usize },

    /// A permutation maps a site onto a site of different type
    #[error("Permutation maps site {from} onto site {to}, which has different states")]
    IncompatibleSites { from: usize, to: usize },
}

/// Result type for symmetry operations
pub type Result<T> = std::result::Result<T, SymmetryError>;
