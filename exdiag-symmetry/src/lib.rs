//! Lattice translation symmetry for exact diagonalization
//!
//! - [`Permutation`]: site permutations with composition and powers
//! - [`TranslationGroup`]: abelian group generated by commuting translations,
//!   with its compatible [`Rational64`] momenta
//! - [`symmetry_reduce`]: project an enumerated basis onto one momentum
//!   sector, giving a [`ReducedRepresentation`]
//!
//! # Example
//!
//! ```
//! use exdiag_core::{HilbertSpace, Site};
//! use exdiag_state::represent;
//! use exdiag_symmetry::{symmetry_reduce_serial, Permutation, TranslationGroup};
//!
//! let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
//! let hs = HilbertSpace::new(vec![spin; 6]);
//! let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
//!
//! let shift = Permutation::new(vec![1, 2, 3, 4, 5, 0]).unwrap();
//! let group = TranslationGroup::new(vec![shift]).unwrap();
//!
//! let total: usize = group
//!     .fractional_momenta()
//!     .iter()
//!     .map(|k| symmetry_reduce_serial(&hsr, &group, k).unwrap().unwrap().dimension())
//!     .sum();
//! assert_eq!(total, hsr.dimension());
//! ```

pub mod config;
pub mod error;
pub mod momentum;
pub mod permutation;
pub mod reduce;
pub mod translation;

pub use config::ReductionConfig;
pub use error::{Result, SymmetryError};
pub use momentum::{fractional_part, Rational64};
pub use permutation::{Permutation, DEFAULT_MAX_CYCLE};
pub use reduce::{
    symmetry_reduce, symmetry_reduce_serial, symmetry_reduce_with, ReducedRepresentation,
};
pub use translation::{
    check_site_compatibility, is_compatible, permute_bits, symmetry_apply, TranslationGroup,
};
