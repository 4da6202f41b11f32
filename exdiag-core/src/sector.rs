//! Restriction of a Hilbert space to allowed aggregate quantum numbers

use crate::hilbert_space::HilbertSpace;
use crate::quantum_number::QuantumNumber;
use std::collections::BTreeSet;

/// Anything that describes which basis states of a Hilbert space to keep.
///
/// Implemented by [`HilbertSpace`] (keep everything) and
/// [`HilbertSpaceSector`] (keep allowed quantum numbers only).
pub trait SpaceSpec<QN: QuantumNumber> {
    /// The underlying Hilbert space
    fn hilbert_space(&self) -> &HilbertSpace<QN>;

    /// Allowed aggregate quantum numbers, `None` for no restriction
    fn allowed_quantum_numbers(&self) -> Option<&BTreeSet<QN>>;
}

impl<QN: QuantumNumber> SpaceSpec<QN> for HilbertSpace<QN> {
    fn hilbert_space(&self) -> &HilbertSpace<QN> {
        self
    }

    fn allowed_quantum_numbers(&self) -> Option<&BTreeSet<QN>> {
        None
    }
}

/// A Hilbert space restricted to a set of aggregate quantum numbers.
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, HilbertSpaceSector, Site};
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin.clone(), spin]);
/// let sector = HilbertSpaceSector::new(hs, [0]);
/// assert!(sector.allows(&0));
/// assert!(!sector.allows(&2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HilbertSpaceSector<QN> {
    hilbert_space: HilbertSpace<QN>,
    allowed: BTreeSet<QN>,
}

impl<QN: QuantumNumber> HilbertSpaceSector<QN> {
    /// Restrict `hilbert_space` to the given quantum numbers
    pub fn new(hilbert_space: HilbertSpace<QN>, allowed: impl IntoIterator<Item = QN>) -> Self {
        Self {
            hilbert_space,
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Sector allowing every reachable quantum number
    pub fn full(hilbert_space: HilbertSpace<QN>) -> Self {
        let allowed = hilbert_space.quantum_number_sectors();
        Self::new(hilbert_space, allowed)
    }

    #[inline]
    pub fn allows(&self, qn: &QN) -> bool {
        self.allowed.contains(qn)
    }

    #[inline]
    pub fn allowed(&self) -> &BTreeSet<QN> {
        &self.allowed
    }

    /// Allowed quantum numbers that some basis state actually reaches
    pub fn quantum_number_sectors(&self) -> Vec<QN> {
        self.hilbert_space
            .quantum_number_sectors()
            .into_iter()
            .filter(|qn| self.allowed.contains(qn))
            .collect()
    }
}

impl<QN: QuantumNumber> SpaceSpec<QN> for HilbertSpaceSector<QN> {
    fn hilbert_space(&self) -> &HilbertSpace<QN> {
        &self.hilbert_space
    }

    fn allowed_quantum_numbers(&self) -> Option<&BTreeSet<QN>> {
        Some(&self.allowed)
    }
}

impl<QN: QuantumNumber> HilbertSpace<QN> {
    /// Restrict to a single aggregate quantum number
    pub fn sector(&self, qn: QN) -> HilbertSpaceSector<QN> {
        HilbertSpaceSector::new(self.clone(), [qn])
    }
}
