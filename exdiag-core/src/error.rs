//! Error types for Hilbert space construction

use thiserror::Error;

/// Errors raised while building or querying sites and Hilbert spaces
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A site must have at least one state
    #[error("Site has no states")]
    EmptySite,

    /// Total bitwidth does not fit into the binary representation type
    #[error("Hilbert space needs {required} bits but the binary representation holds {available}")]
    BitWidthOverflow { required: u32, available: u32 },

    /// Site index out of range
    #[error("Site index {index} out of bounds for {num_sites}-site Hilbert space")]
    SiteIndexOutOfBounds { index: usize, num_sites: usize },

    /// Local state index out of range for a site
    #[error("Local state index {index} out of bounds for site of dimension {dimension}")]
    LocalIndexOutOfBounds { index: usize, dimension: usize },

    /// Wrong number of per-site indices
    #[error("Expected {expected} site indices, got {actual}")]
    IndexCountMismatch { expected: usize, actual: usize },

    /// Bit pattern that does not encode a basis state of the layout
    #[error("Binary representation {binrep:#b} is not a valid basis state")]
    InvalidBinaryRepresentation { binrep: u128 },
}

/// Result type for Hilbert space operations
pub type Result<T> = std::result::Result<T, CoreError>;
