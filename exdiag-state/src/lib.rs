//! Concrete basis representations for exact diagonalization
//!
//! This crate turns an abstract [`HilbertSpace`](exdiag_core::HilbertSpace)
//! into an indexed basis:
//!
//! - [`represent`] / [`represent_with`]: enumerate all basis states of a
//!   Hilbert space or sector into a [`HilbertSpaceRepresentation`]
//! - [`Representation`]: the indexing interface operator kernels work against
//! - [`SparseState`]: accumulating sparse vector keyed by bit pattern
//!
//! # Example
//!
//! ```
//! use exdiag_core::{HilbertSpace, Site};
//! use exdiag_state::{represent, Representation};
//!
//! let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
//! let hs = HilbertSpace::new(vec![spin; 6]);
//! let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
//!
//! assert_eq!(hsr.dimension(), 20);
//! assert_eq!(hsr.lookup(0b000111).index(), Some(0));
//! ```

pub mod config;
pub mod error;
pub mod hilbert_space_representation;
pub mod representation;
pub mod sparse_state;

pub use config::RepresentConfig;
pub use error::{Result, StateError};
pub use hilbert_space_representation::{represent, represent_with, HilbertSpaceRepresentation};
pub use representation::{Lookup, Representation};
pub use sparse_state::SparseState;
