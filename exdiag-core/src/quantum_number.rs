//! Conserved quantum numbers attached to local states
//!
//! The aggregate quantum number of a basis state is the combination of the
//! quantum numbers of every site's local state. The default rule is
//! (element-wise) addition; a model with a different conservation law wraps
//! its label in a newtype and implements [`QuantumNumber`] itself.

use std::fmt::Debug;
use std::hash::Hash;

/// A conserved label with an associative, commutative combination rule.
pub trait QuantumNumber: Clone + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Neutral element of [`combine`](QuantumNumber::combine)
    fn identity() -> Self;

    /// Combine the quantum numbers of two subsystems
    fn combine(&self, other: &Self) -> Self;
}

macro_rules! impl_additive_quantum_number {
    ($($t:ty),*) => {
        $(
            impl QuantumNumber for $t {
                #[inline]
                fn identity() -> Self {
                    0
                }

                #[inline]
                fn combine(&self, other: &Self) -> Self {
                    *self + *other
                }
            }
        )*
    };
}

impl_additive_quantum_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// No conserved quantity
impl QuantumNumber for () {
    fn identity() -> Self {}

    fn combine(&self, _other: &Self) -> Self {}
}

/// Several independent conserved quantities (e.g. `[N_up, N_dn]`)
impl<T: QuantumNumber, const N: usize> QuantumNumber for [T; N] {
    fn identity() -> Self {
        std::array::from_fn(|_| T::identity())
    }

    fn combine(&self, other: &Self) -> Self {
        std::array::from_fn(|i| self[i].combine(&other[i]))
    }
}

impl<A: QuantumNumber, B: QuantumNumber> QuantumNumber for (A, B) {
    fn identity() -> Self {
        (A::identity(), B::identity())
    }

    fn combine(&self, other: &Self) -> Self {
        (self.0.combine(&other.0), self.1.combine(&other.1))
    }
}
