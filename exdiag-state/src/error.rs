//! Error types for basis representations

use exdiag_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building or querying a representation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Layout or site error from the Hilbert space
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Bit pattern that is not a basis state of the Hilbert space
    #[error("Binary representation {binrep:#b} is not a basis state of the Hilbert space")]
    InvalidBasisState { binrep: u128 },
}

/// Result type for representation operations
pub type Result<T> = std::result::Result<T, StateError>;
