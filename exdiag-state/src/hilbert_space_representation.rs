//! Enumerated basis of a Hilbert space or sector
//!
//! Basis vectors are generated site by site, most significant site first, so
//! the list comes out in ascending bit-pattern order without sorting. When a
//! sector is requested, branches whose partial quantum number can no longer
//! reach an allowed value are pruned before descending further.

use crate::config::RepresentConfig;
use crate::error::{Result, StateError};
use crate::representation::{Lookup, Representation};
use ahash::AHashMap;
use exdiag_core::{BitRep, HilbertSpace, QuantumNumber, SpaceSpec};
use num_complex::Complex64;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Concrete Hilbert space: sorted basis list plus reverse lookup.
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, Site};
/// use exdiag_state::represent;
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin.clone(), spin]);
///
/// let full = represent::<u32, _, _>(&hs).unwrap();
/// assert_eq!(full.dimension(), 4);
///
/// let zero = represent::<u32, _, _>(&hs.sector(0)).unwrap();
/// assert_eq!(zero.basis_list(), &[0b01, 0b10]);
/// ```
#[derive(Debug, Clone)]
pub struct HilbertSpaceRepresentation<BR, QN> {
    hilbert_space: HilbertSpace<QN>,
    basis_list: Vec<BR>,
    basis_lookup: AHashMap<BR, usize>,
}

/// Make a representation with all basis vectors of `space`
///
/// # Errors
/// Fails if the Hilbert space does not fit into `BR`
pub fn represent<BR, QN, S>(space: &S) -> Result<HilbertSpaceRepresentation<BR, QN>>
where
    BR: BitRep,
    QN: QuantumNumber,
    S: SpaceSpec<QN>,
{
    represent_with(space, &RepresentConfig::default())
}

/// Make a representation of `space` with explicit enumeration settings
pub fn represent_with<BR, QN, S>(
    space: &S,
    config: &RepresentConfig,
) -> Result<HilbertSpaceRepresentation<BR, QN>>
where
    BR: BitRep,
    QN: QuantumNumber,
    S: SpaceSpec<QN>,
{
    let hs = space.hilbert_space();
    hs.check_capacity::<BR>()?;

    let enumerator = Enumerator::new(hs, space.allowed_quantum_numbers());
    let basis_list: Vec<BR> = if config.use_parallel(hs.bitwidth()) {
        enumerator.enumerate_parallel()
    } else {
        enumerator.enumerate_serial()
    };
    debug_assert!(basis_list.windows(2).all(|w| w[0] < w[1]));

    tracing::debug!(
        num_sites = hs.num_sites(),
        bitwidth = hs.bitwidth(),
        dimension = basis_list.len(),
        "enumerated basis"
    );
    if basis_list.is_empty() {
        tracing::warn!("representation has dimension zero; no basis state carries an allowed quantum number");
    }

    Ok(HilbertSpaceRepresentation::from_sorted(hs.clone(), basis_list))
}

impl<BR: BitRep, QN: QuantumNumber> HilbertSpaceRepresentation<BR, QN> {
    /// Make a representation from an explicit list of basis states.
    ///
    /// The list is sorted and deduplicated.
    ///
    /// # Errors
    /// Fails if the layout does not fit into `BR` or an entry is not a valid
    /// basis state of `hilbert_space`.
    pub fn from_basis(hilbert_space: HilbertSpace<QN>, mut basis_list: Vec<BR>) -> Result<Self> {
        hilbert_space.check_capacity::<BR>()?;
        if let Some(&bad) = basis_list.iter().find(|&&b| !hilbert_space.is_valid(b)) {
            return Err(StateError::InvalidBasisState {
                binrep: bad.widen(),
            });
        }
        basis_list.sort_unstable();
        basis_list.dedup();
        Ok(Self::from_sorted(hilbert_space, basis_list))
    }

    fn from_sorted(hilbert_space: HilbertSpace<QN>, basis_list: Vec<BR>) -> Self {
        let mut basis_lookup = AHashMap::with_capacity(basis_list.len());
        for (index, &binrep) in basis_list.iter().enumerate() {
            basis_lookup.insert(binrep, index);
        }
        Self {
            hilbert_space,
            basis_list,
            basis_lookup,
        }
    }

    #[inline]
    pub fn hilbert_space(&self) -> &HilbertSpace<QN> {
        &self.hilbert_space
    }

    /// Number of basis vectors
    #[inline]
    pub fn dimension(&self) -> usize {
        self.basis_list.len()
    }

    /// Number of bits used by the layout
    #[inline]
    pub fn bitwidth(&self) -> u32 {
        self.hilbert_space.bitwidth()
    }

    /// Basis states in ascending order
    #[inline]
    pub fn basis_list(&self) -> &[BR] {
        &self.basis_list
    }

    /// Basis state at row `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<BR> {
        self.basis_list.get(index).copied()
    }

    /// Row index of a basis state, `None` if it is not part of the basis
    #[inline]
    pub fn index_of(&self, binrep: BR) -> Option<usize> {
        self.basis_lookup.get(&binrep).copied()
    }

    #[inline]
    pub fn contains(&self, binrep: BR) -> bool {
        self.basis_lookup.contains_key(&binrep)
    }

    pub fn iter(&self) -> impl Iterator<Item = BR> + '_ {
        self.basis_list.iter().copied()
    }
}

impl<BR: BitRep, QN: QuantumNumber> Representation for HilbertSpaceRepresentation<BR, QN> {
    type BinRep = BR;
    type QN = QN;

    fn hilbert_space(&self) -> &HilbertSpace<QN> {
        &self.hilbert_space
    }

    fn dimension(&self) -> usize {
        self.basis_list.len()
    }

    fn basis_state(&self, index: usize) -> Option<BR> {
        self.get(index)
    }

    fn basis_amplitude(&self, _index: usize) -> Complex64 {
        Complex64::new(1.0, 0.0)
    }

    fn lookup(&self, binrep: BR) -> Lookup {
        match self.index_of(binrep) {
            Some(index) => Lookup::Found {
                index,
                amplitude: Complex64::new(1.0, 0.0),
            },
            None => Lookup::Missing,
        }
    }
}

/// Depth-first product enumeration with quantum number pruning
struct Enumerator<'a, QN> {
    hs: &'a HilbertSpace<QN>,
    /// `acceptable[j]`: partial quantum numbers of sites `j..n` that can still
    /// be completed by sites `0..j` into an allowed value (`None`: no sector)
    acceptable: Option<Vec<BTreeSet<QN>>>,
}

impl<'a, QN: QuantumNumber> Enumerator<'a, QN> {
    fn new(hs: &'a HilbertSpace<QN>, allowed: Option<&BTreeSet<QN>>) -> Self {
        let acceptable = allowed.map(|allowed| {
            let prefixes = hs.prefix_quantum_numbers();
            let suffixes = hs.suffix_quantum_numbers();
            prefixes
                .iter()
                .zip(suffixes)
                .map(|(prefix, suffix)| {
                    suffix
                        .into_iter()
                        .filter(|partial| {
                            prefix
                                .iter()
                                .any(|rest| allowed.contains(&partial.combine(rest)))
                        })
                        .collect()
                })
                .collect()
        });
        Self { hs, acceptable }
    }

    #[inline]
    fn accepts(&self, level: usize, qn: &QN) -> bool {
        match &self.acceptable {
            Some(acceptable) => acceptable[level].contains(qn),
            None => true,
        }
    }

    fn enumerate_serial<BR: BitRep>(&self) -> Vec<BR> {
        let mut out = Vec::new();
        let n = self.hs.num_sites();
        if self.accepts(n, &QN::identity()) {
            self.descend(n, BR::zero(), QN::identity(), &mut out);
        }
        out
    }

    /// Split on the most significant site; branches are concatenated in order
    fn enumerate_parallel<BR: BitRep>(&self) -> Vec<BR> {
        let n = self.hs.num_sites();
        if n == 0 {
            return self.enumerate_serial();
        }
        let top = n - 1;
        let site = &self.hs.sites()[top];
        let offset = self.hs.bitoffsets()[top] as usize;
        let shift = self.hs.bitwidths()[top] > 0;

        let branches: Vec<Vec<BR>> = site
            .states()
            .par_iter()
            .enumerate()
            .map(|(index, state)| {
                let qn = QN::identity().combine(state.quantum_number());
                let mut out = Vec::new();
                if self.accepts(top, &qn) {
                    let partial = if shift {
                        BR::from_index(index) << offset
                    } else {
                        BR::zero()
                    };
                    self.descend(top, partial, qn, &mut out);
                }
                out
            })
            .collect();

        branches.concat()
    }

    /// Sites `0..level` are still open
    fn descend<BR: BitRep>(&self, level: usize, partial: BR, qn: QN, out: &mut Vec<BR>) {
        if level == 0 {
            out.push(partial);
            return;
        }
        let site_index = level - 1;
        let site = &self.hs.sites()[site_index];
        let offset = self.hs.bitoffsets()[site_index] as usize;
        let shift = self.hs.bitwidths()[site_index] > 0;

        for (index, state) in site.states().iter().enumerate() {
            let next = qn.combine(state.quantum_number());
            if !self.accepts(site_index, &next) {
                continue;
            }
            let binrep = if shift {
                partial | (BR::from_index(index) << offset)
            } else {
                partial
            };
            self.descend(site_index, binrep, next, out);
        }
    }
}
