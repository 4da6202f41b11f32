//! Bit-packed layout of a many-site Hilbert space
//!
//! A [`HilbertSpace`] is an ordered list of sites. Each site gets a field of
//! `bitwidth[i]` bits starting at `bitoffset[i]` in the binary representation
//! of a basis state:
//!
//! ```text
//!   site:      n-1        ...        1        0
//!   bits:  [ field n-1 ] ... [ field 1 ][ field 0 ]
//!                                       ^ offset[1]  ^ offset[0] = 0
//! ```

use crate::bitrep::BitRep;
use crate::error::{CoreError, Result};
use crate::quantum_number::QuantumNumber;
use crate::site::{Site, State};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Per-site local state indices of one basis state
pub type SiteIndices = SmallVec<[usize; 32]>;

/// Hilbert space of an ordered sequence of sites.
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, Site};
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin.clone(), spin.clone(), spin]);
/// assert_eq!(hs.bitwidth(), 3);
/// assert_eq!(hs.bitoffsets(), &[0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HilbertSpace<QN> {
    sites: Vec<Site<QN>>,
    bitwidths: Vec<u32>,
    bitoffsets: Vec<u32>,
}

impl<QN: QuantumNumber> HilbertSpace<QN> {
    /// Create a Hilbert space, computing the bit layout eagerly
    pub fn new(sites: Vec<Site<QN>>) -> Self {
        let bitwidths: Vec<u32> = sites.iter().map(Site::bitwidth).collect();
        let mut bitoffsets = Vec::with_capacity(sites.len() + 1);
        let mut offset = 0u32;
        bitoffsets.push(offset);
        for &width in &bitwidths {
            offset += width;
            bitoffsets.push(offset);
        }

        Self {
            sites,
            bitwidths,
            bitoffsets,
        }
    }

    /// Create a Hilbert space and check that it fits into `BR`
    pub fn with_binary_type<BR: BitRep>(sites: Vec<Site<QN>>) -> Result<Self> {
        let hs = Self::new(sites);
        hs.check_capacity::<BR>()?;
        Ok(hs)
    }

    /// Check that the total bitwidth fits into the binary representation `BR`
    pub fn check_capacity<BR: BitRep>(&self) -> Result<()> {
        if self.bitwidth() > BR::BITS {
            return Err(CoreError::BitWidthOverflow {
                required: self.bitwidth(),
                available: BR::BITS,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn sites(&self) -> &[Site<QN>] {
        &self.sites
    }

    /// Site at position `index`
    pub fn site(&self, index: usize) -> Result<&Site<QN>> {
        self.sites.get(index).ok_or(CoreError::SiteIndexOutOfBounds {
            index,
            num_sites: self.sites.len(),
        })
    }

    /// Total number of bits
    #[inline]
    pub fn bitwidth(&self) -> u32 {
        self.bitoffsets[self.sites.len()]
    }

    /// Per-site bitwidths
    #[inline]
    pub fn bitwidths(&self) -> &[u32] {
        &self.bitwidths
    }

    /// Cumulative bit offsets (`num_sites + 1` entries, last one is the total)
    #[inline]
    pub fn bitoffsets(&self) -> &[u32] {
        &self.bitoffsets
    }

    /// Name of the quantum number type
    pub fn qntype(&self) -> &'static str {
        std::any::type_name::<QN>()
    }

    /// Bitmask selecting the field of one site
    pub fn site_mask<BR: BitRep>(&self, site: usize) -> Result<BR> {
        let width = self.site_width(site)?;
        if width == 0 {
            return Ok(BR::zero());
        }
        Ok(BR::mask(width) << self.bitoffsets[site] as usize)
    }

    /// Local state index of one site in `binrep` (not range-checked)
    pub fn get_state_index<BR: BitRep>(&self, binrep: BR, site: usize) -> Result<usize> {
        let width = self.site_width(site)?;
        Ok(self.field(binrep, site, width))
    }

    /// Convert a binary representation to the array of per-site state indices
    pub fn extract<BR: BitRep>(&self, binrep: BR) -> SiteIndices {
        self.bitwidths
            .iter()
            .enumerate()
            .map(|(site, &width)| self.field(binrep, site, width))
            .collect()
    }

    /// Pack per-site state indices into a binary representation
    ///
    /// # Errors
    /// Fails if the number of indices does not match the number of sites, an
    /// index exceeds its site's dimension, or the layout does not fit `BR`.
    pub fn pack<BR: BitRep>(&self, indices: &[usize]) -> Result<BR> {
        self.check_capacity::<BR>()?;
        if indices.len() != self.sites.len() {
            return Err(CoreError::IndexCountMismatch {
                expected: self.sites.len(),
                actual: indices.len(),
            });
        }

        let mut binrep = BR::zero();
        for (site, &index) in indices.iter().enumerate() {
            let dimension = self.sites[site].dimension();
            if index >= dimension {
                return Err(CoreError::LocalIndexOutOfBounds { index, dimension });
            }
            if self.bitwidths[site] > 0 {
                binrep = binrep | (BR::from_index(index) << self.bitoffsets[site] as usize);
            }
        }
        Ok(binrep)
    }

    /// Local state of one site in `binrep`
    pub fn get_site_state<BR: BitRep>(&self, binrep: BR, site: usize) -> Result<&State<QN>> {
        let index = self.get_state_index(binrep, site)?;
        self.sites[site].get_state(index)
    }

    /// Whether `binrep` encodes a basis state: unused high bits are zero and
    /// every site field holds an existing local state
    pub fn is_valid<BR: BitRep>(&self, binrep: BR) -> bool {
        let total = self.bitwidth();
        if total < BR::BITS && (binrep >> total as usize) != BR::zero() {
            return false;
        }
        self.bitwidths
            .iter()
            .enumerate()
            .all(|(site, &width)| self.field(binrep, site, width) < self.sites[site].dimension())
    }

    /// Aggregate quantum number of the basis state `binrep`
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidBinaryRepresentation`] if a site field does
    /// not address a state.
    pub fn get_quantum_number<BR: BitRep>(&self, binrep: BR) -> Result<QN> {
        let mut qn = QN::identity();
        for (site, &width) in self.bitwidths.iter().enumerate() {
            let index = self.field(binrep, site, width);
            let state = self.sites[site].states().get(index).ok_or(
                CoreError::InvalidBinaryRepresentation {
                    binrep: binrep.widen(),
                },
            )?;
            qn = qn.combine(state.quantum_number());
        }
        Ok(qn)
    }

    /// Quantum numbers reachable by the sites `start..` (one set per start
    /// position, plus the trivial set `{identity}` at `num_sites`)
    pub fn suffix_quantum_numbers(&self) -> Vec<BTreeSet<QN>> {
        let n = self.sites.len();
        let mut suffixes = vec![BTreeSet::new(); n + 1];
        suffixes[n].insert(QN::identity());
        for site in (0..n).rev() {
            let mut reachable = BTreeSet::new();
            for local in self.sites[site].quantum_numbers() {
                for rest in &suffixes[site + 1] {
                    reachable.insert(local.combine(rest));
                }
            }
            suffixes[site] = reachable;
        }
        suffixes
    }

    /// Quantum numbers reachable by the sites `..end` (one set per end
    /// position, starting with the trivial set `{identity}`)
    pub fn prefix_quantum_numbers(&self) -> Vec<BTreeSet<QN>> {
        let mut prefixes = Vec::with_capacity(self.sites.len() + 1);
        prefixes.push(BTreeSet::from([QN::identity()]));
        for site in &self.sites {
            let previous = &prefixes[prefixes.len() - 1];
            let mut reachable = BTreeSet::new();
            for done in previous {
                for local in site.quantum_numbers() {
                    reachable.insert(done.combine(local));
                }
            }
            prefixes.push(reachable);
        }
        prefixes
    }

    /// All aggregate quantum numbers reachable by some basis state, sorted
    pub fn quantum_number_sectors(&self) -> Vec<QN> {
        self.suffix_quantum_numbers()
            .swap_remove(0)
            .into_iter()
            .collect()
    }

    fn site_width(&self, site: usize) -> Result<u32> {
        self.bitwidths
            .get(site)
            .copied()
            .ok_or(CoreError::SiteIndexOutOfBounds {
                index: site,
                num_sites: self.sites.len(),
            })
    }

    #[inline]
    fn field<BR: BitRep>(&self, binrep: BR, site: usize, width: u32) -> usize {
        let offset = self.bitoffsets[site];
        if width == 0 || offset >= BR::BITS {
            return 0;
        }
        ((binrep >> offset as usize) & BR::mask(width)).as_index()
    }
}
