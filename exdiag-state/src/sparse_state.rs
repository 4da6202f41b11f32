//! Sparse vectors over bit-pattern keys
//!
//! A [`SparseState`] collects the weighted basis states produced by applying
//! an operator to a single basis vector. Adding the same key twice
//! accumulates the amplitudes.

use ahash::AHashMap;
use exdiag_core::BitRep;
use num_complex::Complex64;
use std::fmt;

/// Default magnitude below which [`SparseState::clean`] drops entries
pub const DEFAULT_CLEAN_TOLERANCE: f64 = 1e-14;

/// Sparse vector mapping binary representations to amplitudes.
///
/// Keys are unique; iteration order is unspecified.
///
/// # Example
///
/// ```
/// use exdiag_state::SparseState;
/// use num_complex::Complex64;
///
/// let mut psi = SparseState::<u32>::new();
/// psi.add(0b01, Complex64::new(0.5, 0.0));
/// psi.add(0b01, Complex64::new(0.5, 0.0));
/// assert_eq!(psi.get(0b01), Complex64::new(1.0, 0.0));
/// assert_eq!(psi.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SparseState<BR> {
    components: AHashMap<BR, Complex64>,
}

impl<BR: BitRep> PartialEq for SparseState<BR> {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl<BR: BitRep> SparseState<BR> {
    pub fn new() -> Self {
        Self {
            components: AHashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: AHashMap::with_capacity(capacity),
        }
    }

    /// State consisting of a single basis vector with unit amplitude
    pub fn basis(binrep: BR) -> Self {
        let mut state = Self::with_capacity(1);
        state.add(binrep, Complex64::new(1.0, 0.0));
        state
    }

    /// Accumulate `amplitude` onto `binrep`
    #[inline]
    pub fn add(&mut self, binrep: BR, amplitude: Complex64) {
        *self
            .components
            .entry(binrep)
            .or_insert(Complex64::new(0.0, 0.0)) += amplitude;
    }

    /// Accumulate `weight * other`
    pub fn add_scaled(&mut self, other: &SparseState<BR>, weight: Complex64) {
        for (&binrep, &amplitude) in &other.components {
            self.add(binrep, weight * amplitude);
        }
    }

    /// Amplitude of `binrep` (zero if absent)
    #[inline]
    pub fn get(&self, binrep: BR) -> Complex64 {
        self.components
            .get(&binrep)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Number of stored components
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BR, Complex64)> + '_ {
        self.components.iter().map(|(&b, &a)| (b, a))
    }

    /// Remove all components, keeping the allocation
    #[inline]
    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Multiply every amplitude by `factor`
    pub fn scale(&mut self, factor: Complex64) {
        for amplitude in self.components.values_mut() {
            *amplitude *= factor;
        }
    }

    /// Drop components with magnitude at or below `tolerance`
    pub fn clean(&mut self, tolerance: f64) {
        self.components.retain(|_, amplitude| amplitude.norm() > tolerance);
    }

    /// Squared L2 norm
    pub fn norm_sqr(&self) -> f64 {
        self.components.values().map(|a| a.norm_sqr()).sum()
    }

    /// Components sorted by key, for deterministic inspection
    pub fn sorted(&self) -> Vec<(BR, Complex64)> {
        let mut terms: Vec<_> = self.iter().collect();
        terms.sort_unstable_by_key(|&(binrep, _)| binrep);
        terms
    }
}

impl<BR: BitRep> FromIterator<(BR, Complex64)> for SparseState<BR> {
    fn from_iter<I: IntoIterator<Item = (BR, Complex64)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (binrep, amplitude) in iter {
            state.add(binrep, amplitude);
        }
        state
    }
}

impl<BR: BitRep> IntoIterator for SparseState<BR> {
    type Item = (BR, Complex64);
    type IntoIter = std::collections::hash_map::IntoIter<BR, Complex64>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}

impl<BR: BitRep> fmt::Debug for SparseState<BR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.sorted().into_iter().map(|(b, a)| (format!("{:#b}", b), a)))
            .finish()
    }
}
