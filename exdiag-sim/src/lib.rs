//! Operators and matrix-vector kernels for exact diagonalization
//!
//! - [`Operator`]: null, pure transition or sum of transitions, with
//!   products, adjoints and symmetry transformations
//! - [`OperatorRepresentation`]: an operator bound to any
//!   [`Representation`](exdiag_state::Representation)
//! - [`apply`] / [`apply_row`]: `out += O · state` and `out += state · O`
//!   over a range of indices, on the calling thread or split across rayon
//!   workers with [`splitblock`]
//!
//! # Example
//!
//! ```
//! use exdiag_core::{HilbertSpace, Site};
//! use exdiag_sim::{pure_operator, ApplyConfig, Operator, OperatorRepresentation};
//! use exdiag_state::represent;
//! use num_complex::Complex64;
//!
//! let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
//! let hs = HilbertSpace::new(vec![spin; 4]);
//! let hsr = represent::<u8, _, _>(&hs.sector(0)).unwrap();
//!
//! let one = Complex64::new(1.0, 0.0);
//! let hop: Operator<u8> = (0..3)
//!     .map(|i| {
//!         Operator::from(pure_operator(&hs, i, 0, 1, one).unwrap())
//!             * Operator::from(pure_operator(&hs, i + 1, 1, 0, one).unwrap())
//!     })
//!     .sum();
//!
//! let opr = OperatorRepresentation::new(&hsr, hop);
//! let state = vec![one; hsr.dimension()];
//! let (out, leakage) = opr.mul_vec(&state, &ApplyConfig::default()).unwrap();
//! assert_eq!(out.len(), 6);
//! assert_eq!(leakage.error, 0.0);
//! ```

pub mod config;
pub mod error;
pub mod kernel;
pub mod operator;
pub mod operator_representation;

pub use config::{ApplyConfig, ExecutionMode};
pub use error::{Result, SimError};
pub use kernel::{
    apply, apply_parallel, apply_row, apply_row_parallel, apply_row_serial, apply_serial,
    splitblock, Leakage,
};
pub use operator::{pure_operator, Operator, PureOperator, SumOperator};
pub use operator_representation::OperatorRepresentation;
