//! Indexed basis abstraction shared by all concrete representations
//!
//! Operator application only needs three things from a basis: how many
//! vectors it has, which bit pattern stands for the vector at a row index, and
//! where an arbitrary bit pattern lands. Plain enumerated bases and
//! symmetry-reduced bases answer these differently, so the kernel is written
//! against [`Representation`].

use exdiag_core::{BitRep, HilbertSpace, QuantumNumber};
use num_complex::Complex64;

/// Where a bit pattern lands in a representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    /// Component of basis vector `index` with the given amplitude
    Found { index: usize, amplitude: Complex64 },

    /// Part of the underlying basis but projected out (zero weight)
    Excluded,

    /// Not part of the underlying basis at all
    Missing,
}

impl Lookup {
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self {
            Lookup::Found { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A concrete, indexed basis of (a subspace of) a Hilbert space
pub trait Representation: Sync {
    /// Binary representation type
    type BinRep: BitRep;

    /// Quantum number type of the Hilbert space
    type QN: QuantumNumber;

    /// The Hilbert space the basis lives in
    fn hilbert_space(&self) -> &HilbertSpace<Self::QN>;

    /// Number of basis vectors
    fn dimension(&self) -> usize;

    /// Representative bit pattern of basis vector `index`
    fn basis_state(&self, index: usize) -> Option<Self::BinRep>;

    /// Amplitude of the representative within basis vector `index`
    ///
    /// Always one for plain enumerated bases.
    fn basis_amplitude(&self, index: usize) -> Complex64;

    /// Locate an arbitrary bit pattern
    fn lookup(&self, binrep: Self::BinRep) -> Lookup;
}
