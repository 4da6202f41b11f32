//! Core types for exact diagonalization of lattice models
//!
//! This crate describes the abstract Hilbert space of a lattice:
//! - [`State`] / [`Site`]: local degrees of freedom and their quantum numbers
//! - [`HilbertSpace`]: ordered sites with a bit-packed layout
//! - [`HilbertSpaceSector`]: restriction to allowed aggregate quantum numbers
//! - [`BitRep`]: unsigned integers used as binary representations of basis states
//!
//! # Example
//! ```
//! use exdiag_core::{HilbertSpace, Site};
//!
//! let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
//! let hs = HilbertSpace::new(vec![spin.clone(), spin]);
//!
//! assert_eq!(hs.bitwidth(), 2);
//! assert_eq!(hs.get_quantum_number(0b01u32).unwrap(), 0);
//! assert_eq!(hs.extract(0b10u32).as_slice(), &[0, 1]);
//! ```

pub mod bitrep;
pub mod error;
pub mod hilbert_space;
pub mod quantum_number;
pub mod sector;
pub mod site;

pub use bitrep::BitRep;
pub use error::{CoreError, Result};
pub use hilbert_space::{HilbertSpace, SiteIndices};
pub use quantum_number::QuantumNumber;
pub use sector::{HilbertSpaceSector, SpaceSpec};
pub use site::{bitwidth_for, Site, State};
