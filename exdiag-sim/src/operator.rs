//! Operators acting on bit-pattern basis states
//!
//! A [`PureOperator`] is a single transition `amplitude · |row><col|` on the
//! sites selected by `bitmask`, acting as the identity on all other sites.
//! General operators are sums of pure terms. Both have closed-form products
//! and adjoints, so operators built from local pieces never need a matrix.

use crate::error::{Result, SimError};
use exdiag_core::{BitRep, CoreError, HilbertSpace, QuantumNumber};
use exdiag_state::sparse_state::DEFAULT_CLEAN_TOLERANCE;
use exdiag_state::SparseState;
use exdiag_symmetry::{check_site_compatibility, permute_bits, Permutation, TranslationGroup};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

/// Single transition `amplitude · |bitrow><bitcol|` on the bits of `bitmask`
///
/// Acting on a ket `|b>` it gives `amplitude · |(b & !bitmask) | bitrow>`
/// when `b & bitmask == bitcol`, and zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PureOperator<BR> {
    bitmask: BR,
    bitrow: BR,
    bitcol: BR,
    amplitude: Complex64,
}

impl<BR: BitRep> PureOperator<BR> {
    /// Create a pure operator
    ///
    /// # Errors
    /// Fails if `bitrow` or `bitcol` has bits outside `bitmask`.
    pub fn new(bitmask: BR, bitrow: BR, bitcol: BR, amplitude: Complex64) -> Result<Self> {
        for pattern in [bitrow, bitcol] {
            if pattern & !bitmask != BR::zero() {
                return Err(SimError::PatternOutsideMask {
                    bitmask: bitmask.widen(),
                    pattern: pattern.widen(),
                });
            }
        }
        Ok(Self {
            bitmask,
            bitrow,
            bitcol,
            amplitude,
        })
    }

    /// `amplitude` times the identity
    pub fn identity(amplitude: Complex64) -> Self {
        Self {
            bitmask: BR::zero(),
            bitrow: BR::zero(),
            bitcol: BR::zero(),
            amplitude,
        }
    }

    #[inline]
    pub fn bitmask(&self) -> BR {
        self.bitmask
    }

    #[inline]
    pub fn bitrow(&self) -> BR {
        self.bitrow
    }

    #[inline]
    pub fn bitcol(&self) -> BR {
        self.bitcol
    }

    #[inline]
    pub fn amplitude(&self) -> Complex64 {
        self.amplitude
    }

    /// `O|ket>`: the pattern it maps to, if any
    #[inline]
    pub fn apply_ket(&self, ket: BR) -> Option<BR> {
        (ket & self.bitmask == self.bitcol).then(|| (ket & !self.bitmask) | self.bitrow)
    }

    /// `<bra|O`: the pattern it maps to, if any
    #[inline]
    pub fn apply_bra(&self, bra: BR) -> Option<BR> {
        (bra & self.bitmask == self.bitrow).then(|| (bra & !self.bitmask) | self.bitcol)
    }

    pub fn adjoint(&self) -> Self {
        Self {
            bitmask: self.bitmask,
            bitrow: self.bitcol,
            bitcol: self.bitrow,
            amplitude: self.amplitude.conj(),
        }
    }

    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            amplitude: self.amplitude * factor,
            ..*self
        }
    }

    /// Product `self · other` (`other` acts first), `None` if it vanishes
    pub fn compose(&self, other: &Self) -> Option<Self> {
        let overlap = self.bitmask & other.bitmask;
        if overlap & self.bitcol != overlap & other.bitrow {
            return None;
        }
        Some(Self {
            bitmask: self.bitmask | other.bitmask,
            bitrow: self.bitrow | (other.bitrow & !self.bitmask),
            bitcol: other.bitcol | (self.bitcol & !other.bitmask),
            amplitude: self.amplitude * other.amplitude,
        })
    }

    /// Move every site field according to `permutation` (unchecked)
    fn permuted<QN: QuantumNumber>(&self, hs: &HilbertSpace<QN>, permutation: &Permutation) -> Self {
        Self {
            bitmask: permute_bits(hs, permutation, self.bitmask),
            bitrow: permute_bits(hs, permutation, self.bitrow),
            bitcol: permute_bits(hs, permutation, self.bitcol),
            amplitude: self.amplitude,
        }
    }

    #[inline]
    fn key(&self) -> (BR, BR, BR) {
        (self.bitmask, self.bitrow, self.bitcol)
    }
}

/// Single-site transition `amplitude · |row_state><col_state|` on `site`
///
/// # Errors
/// Fails if `site` or either local state index is out of range, or if the
/// Hilbert space does not fit in `BR`.
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, Site};
/// use exdiag_sim::pure_operator;
/// use num_complex::Complex64;
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin; 3]);
///
/// // raise site 1: |Up><Dn|
/// let raise = pure_operator::<u8, _>(&hs, 1, 0, 1, Complex64::new(1.0, 0.0)).unwrap();
/// assert_eq!(raise.apply_ket(0b010), Some(0b000));
/// assert_eq!(raise.apply_ket(0b000), None);
/// ```
pub fn pure_operator<BR: BitRep, QN: QuantumNumber>(
    hs: &HilbertSpace<QN>,
    site: usize,
    row_state: usize,
    col_state: usize,
    amplitude: Complex64,
) -> Result<PureOperator<BR>> {
    hs.check_capacity::<BR>()?;
    let dimension = hs.site(site)?.dimension();
    for index in [row_state, col_state] {
        if index >= dimension {
            return Err(CoreError::LocalIndexOutOfBounds { index, dimension }.into());
        }
    }
    let offset = hs.bitoffsets()[site] as usize;
    PureOperator::new(
        hs.site_mask::<BR>(site)?,
        BR::from_index(row_state) << offset,
        BR::from_index(col_state) << offset,
        amplitude,
    )
}

/// Sum of pure terms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SumOperator<BR> {
    terms: SmallVec<[PureOperator<BR>; 4]>,
}

impl<BR: BitRep> SumOperator<BR> {
    pub fn new(terms: impl IntoIterator<Item = PureOperator<BR>>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    #[inline]
    pub fn terms(&self) -> &[PureOperator<BR>] {
        &self.terms
    }
}

/// A linear operator on the bit-pattern basis
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Operator<BR> {
    /// The zero operator
    #[default]
    Null,

    /// A single transition
    Pure(PureOperator<BR>),

    /// A sum of transitions
    Sum(SumOperator<BR>),
}

impl<BR: BitRep> Operator<BR> {
    /// Collect pure terms into the smallest matching variant
    pub fn from_terms(terms: impl IntoIterator<Item = PureOperator<BR>>) -> Self {
        let terms: SmallVec<[PureOperator<BR>; 4]> = terms.into_iter().collect();
        match terms.len() {
            0 => Operator::Null,
            1 => Operator::Pure(terms[0]),
            _ => Operator::Sum(SumOperator { terms }),
        }
    }

    pub fn identity() -> Self {
        Operator::Pure(PureOperator::identity(Complex64::new(1.0, 0.0)))
    }

    #[inline]
    pub fn terms(&self) -> &[PureOperator<BR>] {
        match self {
            Operator::Null => &[],
            Operator::Pure(term) => std::slice::from_ref(term),
            Operator::Sum(sum) => sum.terms(),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.terms().is_empty()
    }

    /// Call `f(ket, <bra|O|ket>)` for every term with a nonzero row entry
    #[inline]
    pub fn for_each_row_term(&self, bra: BR, mut f: impl FnMut(BR, Complex64)) {
        for term in self.terms() {
            if let Some(ket) = term.apply_bra(bra) {
                f(ket, term.amplitude);
            }
        }
    }

    /// Call `f(bra, <bra|O|ket>)` for every term with a nonzero column entry
    #[inline]
    pub fn for_each_column_term(&self, ket: BR, mut f: impl FnMut(BR, Complex64)) {
        for term in self.terms() {
            if let Some(bra) = term.apply_ket(ket) {
                f(bra, term.amplitude);
            }
        }
    }

    /// Accumulate the row `<bra|O` into `terms`
    pub fn row_terms_into(&self, bra: BR, terms: &mut SparseState<BR>) {
        self.for_each_row_term(bra, |ket, amplitude| terms.add(ket, amplitude));
    }

    /// Accumulate the column `O|ket>` into `terms`
    pub fn column_terms_into(&self, ket: BR, terms: &mut SparseState<BR>) {
        self.for_each_column_term(ket, |bra, amplitude| terms.add(bra, amplitude));
    }

    /// Nonzero entries `<bra|O|b'>`, keyed by `b'`
    pub fn row_terms(&self, bra: BR) -> SparseState<BR> {
        let mut terms = SparseState::new();
        self.row_terms_into(bra, &mut terms);
        terms
    }

    /// Nonzero entries `<b'|O|ket>`, keyed by `b'`
    pub fn column_terms(&self, ket: BR) -> SparseState<BR> {
        let mut terms = SparseState::new();
        self.column_terms_into(ket, &mut terms);
        terms
    }

    pub fn adjoint(&self) -> Self {
        Self::from_terms(self.terms().iter().map(PureOperator::adjoint))
    }

    pub fn scale(&self, factor: Complex64) -> Self {
        Self::from_terms(self.terms().iter().map(|t| t.scale(factor)))
    }

    /// Merge terms acting identically and drop vanishing ones
    ///
    /// The result has its terms sorted, so two simplified operators that are
    /// equal as matrices compare equal up to rounding.
    pub fn simplify(&self) -> Self {
        let mut terms: Vec<PureOperator<BR>> = self.terms().to_vec();
        terms.sort_by_key(PureOperator::key);
        let mut merged: SmallVec<[PureOperator<BR>; 4]> = SmallVec::new();
        for term in terms {
            match merged.last_mut() {
                Some(last) if last.key() == term.key() => last.amplitude += term.amplitude,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| t.amplitude.norm() > DEFAULT_CLEAN_TOLERANCE);
        Self::from_terms(merged)
    }

    /// Conjugate by the site permutation: `P O P⁻¹`
    ///
    /// # Errors
    /// Fails if the permutation maps sites onto sites of a different kind.
    pub fn symmetry_apply<QN: QuantumNumber>(
        &self,
        hs: &HilbertSpace<QN>,
        permutation: &Permutation,
    ) -> Result<Self> {
        check_site_compatibility(hs, permutation)?;
        Ok(Self::from_terms(
            self.terms().iter().map(|t| t.permuted(hs, permutation)),
        ))
    }

    /// Whether every generator of `group` leaves the operator unchanged
    pub fn is_invariant<QN: QuantumNumber>(
        &self,
        hs: &HilbertSpace<QN>,
        group: &TranslationGroup,
    ) -> Result<bool> {
        for generator in group.generators() {
            let transformed = self.symmetry_apply(hs, generator)?;
            if !(transformed - self.clone()).simplify().is_null() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<BR: BitRep> From<PureOperator<BR>> for Operator<BR> {
    fn from(term: PureOperator<BR>) -> Self {
        Operator::Pure(term)
    }
}

impl<BR: BitRep> Add for Operator<BR> {
    type Output = Operator<BR>;

    fn add(self, rhs: Operator<BR>) -> Operator<BR> {
        Operator::from_terms(self.terms().iter().chain(rhs.terms()).copied())
    }
}

impl<BR: BitRep> Sub for Operator<BR> {
    type Output = Operator<BR>;

    fn sub(self, rhs: Operator<BR>) -> Operator<BR> {
        self + (-rhs)
    }
}

impl<BR: BitRep> Neg for Operator<BR> {
    type Output = Operator<BR>;

    fn neg(self) -> Operator<BR> {
        self.scale(Complex64::new(-1.0, 0.0))
    }
}

impl<BR: BitRep> Mul for Operator<BR> {
    type Output = Operator<BR>;

    /// Operator product; `rhs` acts first
    fn mul(self, rhs: Operator<BR>) -> Operator<BR> {
        Operator::from_terms(
            self.terms()
                .iter()
                .flat_map(|a| rhs.terms().iter().filter_map(move |b| a.compose(b))),
        )
    }
}

impl<BR: BitRep> Mul<Complex64> for Operator<BR> {
    type Output = Operator<BR>;

    fn mul(self, rhs: Complex64) -> Operator<BR> {
        self.scale(rhs)
    }
}

impl<BR: BitRep> Mul<f64> for Operator<BR> {
    type Output = Operator<BR>;

    fn mul(self, rhs: f64) -> Operator<BR> {
        self.scale(Complex64::new(rhs, 0.0))
    }
}

impl<BR: BitRep> Mul<Operator<BR>> for Complex64 {
    type Output = Operator<BR>;

    fn mul(self, rhs: Operator<BR>) -> Operator<BR> {
        rhs.scale(self)
    }
}

impl<BR: BitRep> Mul<Operator<BR>> for f64 {
    type Output = Operator<BR>;

    fn mul(self, rhs: Operator<BR>) -> Operator<BR> {
        rhs.scale(Complex64::new(self, 0.0))
    }
}

impl<BR: BitRep> Sum for Operator<BR> {
    fn sum<I: Iterator<Item = Operator<BR>>>(iter: I) -> Self {
        Operator::from_terms(iter.flat_map(|op| op.terms().to_vec()))
    }
}
