//! Local degrees of freedom: states and sites

use crate::bitrep::BitRep;
use crate::error::{CoreError, Result};
use crate::quantum_number::QuantumNumber;

/// A named local state carrying a quantum number.
///
/// # Example
///
/// ```
/// use exdiag_core::State;
///
/// let up = State::new("Up", 1i64);
/// assert_eq!(up.name(), "Up");
/// assert_eq!(*up.quantum_number(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State<QN> {
    name: String,
    quantum_number: QN,
}

impl<QN: QuantumNumber> State<QN> {
    /// Create a state with the given label and quantum number
    pub fn new(name: impl Into<String>, quantum_number: QN) -> Self {
        Self {
            name: name.into(),
            quantum_number,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn quantum_number(&self) -> &QN {
        &self.quantum_number
    }
}

/// Number of bits needed to index `dimension` local states.
///
/// A single-state site needs no bits at all.
#[inline]
pub fn bitwidth_for(dimension: usize) -> u32 {
    if dimension <= 1 {
        0
    } else {
        usize::BITS - (dimension - 1).leading_zeros()
    }
}

/// An ordered collection of local states.
///
/// States are addressed by their position `0..dimension`.
///
/// # Example
///
/// ```
/// use exdiag_core::{Site, State};
///
/// let spin = Site::new(vec![State::new("Up", 1i64), State::new("Dn", -1)]).unwrap();
/// assert_eq!(spin.dimension(), 2);
/// assert_eq!(spin.bitwidth(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Site<QN> {
    states: Vec<State<QN>>,
}

impl<QN: QuantumNumber> Site<QN> {
    /// Create a site from its states
    ///
    /// # Errors
    /// Returns [`CoreError::EmptySite`] if `states` is empty
    pub fn new(states: Vec<State<QN>>) -> Result<Self> {
        if states.is_empty() {
            return Err(CoreError::EmptySite);
        }
        Ok(Self { states })
    }

    /// Create a site from `(name, quantum number)` pairs
    pub fn from_pairs<S, I>(pairs: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, QN)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, qn)| State::new(name, qn))
                .collect(),
        )
    }

    /// Number of local states
    #[inline]
    pub fn dimension(&self) -> usize {
        self.states.len()
    }

    /// Number of bits necessary to represent the states of this site
    #[inline]
    pub fn bitwidth(&self) -> u32 {
        bitwidth_for(self.states.len())
    }

    #[inline]
    pub fn states(&self) -> &[State<QN>] {
        &self.states
    }

    /// State at a local index
    pub fn get_state(&self, index: usize) -> Result<&State<QN>> {
        self.states
            .get(index)
            .ok_or(CoreError::LocalIndexOutOfBounds {
                index,
                dimension: self.states.len(),
            })
    }

    /// State encoded by the (already shifted and masked) bits `binrep`
    pub fn get_state_from_bits<BR: BitRep>(&self, binrep: BR) -> Result<&State<QN>> {
        if binrep > BR::mask(self.bitwidth()) {
            return Err(CoreError::InvalidBinaryRepresentation {
                binrep: binrep.widen(),
            });
        }
        self.get_state(binrep.as_index())
    }

    /// Quantum numbers of the local states, in order
    pub fn quantum_numbers(&self) -> impl Iterator<Item = &QN> + '_ {
        self.states.iter().map(State::quantum_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin_half() -> Site<i64> {
        Site::from_pairs([("Up", 1), ("Dn", -1)]).unwrap()
    }

    #[test]
    fn test_bitwidth_for() {
        assert_eq!(bitwidth_for(1), 0);
        assert_eq!(bitwidth_for(2), 1);
        assert_eq!(bitwidth_for(3), 2);
        assert_eq!(bitwidth_for(4), 2);
        assert_eq!(bitwidth_for(5), 3);
        assert_eq!(bitwidth_for(8), 3);
        assert_eq!(bitwidth_for(9), 4);
    }

    #[test]
    fn test_bitwidth_matches_ceil_log2() {
        for dim in 2..200usize {
            let expected = (dim as f64).log2().ceil() as u32;
            assert_eq!(bitwidth_for(dim), expected, "dimension {}", dim);
        }
    }

    #[test]
    fn test_empty_site_rejected() {
        let result = Site::<i64>::new(vec![]);
        assert_eq!(result.unwrap_err(), CoreError::EmptySite);
    }

    #[test]
    fn test_single_state_site() {
        let site = Site::new(vec![State::new("Vac", 0i32)]).unwrap();
        assert_eq!(site.dimension(), 1);
        assert_eq!(site.bitwidth(), 0);
    }

    #[test]
    fn test_get_state() {
        let site = spin_half();
        assert_eq!(site.get_state(0).unwrap().name(), "Up");
        assert_eq!(*site.get_state(1).unwrap().quantum_number(), -1);
        assert!(site.get_state(2).is_err());
    }

    #[test]
    fn test_get_state_from_bits() {
        let site = Site::from_pairs([("0", 0i32), ("1", 1), ("2", 2)]).unwrap();
        assert_eq!(site.get_state_from_bits(2u8).unwrap().name(), "2");
        // 0b11 fits into two bits but has no state behind it
        assert!(site.get_state_from_bits(3u8).is_err());
        assert!(site.get_state_from_bits(4u8).is_err());
    }
}
