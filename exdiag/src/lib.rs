//! # exdiag
//!
//! Building blocks for exact diagonalization of lattice models:
//!
//! - **Layout** ([`exdiag_core`]): sites, Hilbert spaces, quantum-number sectors
//! - **Bases** ([`exdiag_state`]): enumerated representations and sparse states
//! - **Symmetry** ([`exdiag_symmetry`]): permutations, translation groups,
//!   momentum-sector reduction
//! - **Operators** ([`exdiag_sim`]): pure and summed operators, matrix-vector
//!   kernels
//!
//! ## Quick Start
//!
//! ```
//! use exdiag::prelude::*;
//!
//! let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
//! let hs = HilbertSpace::new(vec![spin; 6]);
//! let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
//!
//! let shift = Permutation::new(vec![1, 2, 3, 4, 5, 0]).unwrap();
//! let group = TranslationGroup::new(vec![shift]).unwrap();
//! let k0 = symmetry_reduce(&hsr, &group, &[Rational64::from_integer(0)], &ReductionConfig::default())
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(hsr.dimension(), 20);
//! assert_eq!(k0.dimension(), 4);
//! ```

pub use exdiag_core;
pub use exdiag_sim;
pub use exdiag_state;
pub use exdiag_symmetry;

pub use exdiag_core::{BitRep, HilbertSpace, HilbertSpaceSector, QuantumNumber, Site, State};
pub use exdiag_sim::{
    apply, apply_parallel, apply_row, apply_row_parallel, apply_row_serial, apply_serial,
    pure_operator, splitblock, ApplyConfig, ExecutionMode, Leakage, Operator,
    OperatorRepresentation, PureOperator, SimError, SumOperator,
};
pub use exdiag_state::{
    represent, represent_with, HilbertSpaceRepresentation, Lookup, RepresentConfig,
    Representation, SparseState,
};
pub use exdiag_symmetry::{
    fractional_part, is_compatible, symmetry_apply, symmetry_reduce, symmetry_reduce_serial,
    symmetry_reduce_with, Permutation, Rational64, ReducedRepresentation, ReductionConfig,
    SymmetryError, TranslationGroup,
};

/// Commonly used types
pub mod prelude {
    pub use crate::{
        apply, apply_row, pure_operator, represent, symmetry_reduce, ApplyConfig, HilbertSpace,
        Leakage, Operator, OperatorRepresentation, Permutation, Rational64, ReductionConfig,
        Representation, Site, TranslationGroup,
    };
    pub use num_complex::Complex64;
}
