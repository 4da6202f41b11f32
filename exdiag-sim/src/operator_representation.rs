//! An operator bound to a concrete basis

use crate::config::ApplyConfig;
use crate::error::{Result, SimError};
use crate::kernel::{self, Leakage};
use crate::operator::Operator;
use exdiag_state::{Lookup, Representation};
use num_complex::Complex64;
use std::ops::Range;

/// Matrix of `operator` in the basis `representation`
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, Site};
/// use exdiag_sim::{pure_operator, Operator, OperatorRepresentation};
/// use exdiag_state::represent;
/// use num_complex::Complex64;
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin; 2]);
/// let hsr = represent::<u8, _, _>(&hs).unwrap();
///
/// let flip: Operator<u8> = pure_operator(&hs, 0, 0, 1, Complex64::new(1.0, 0.0)).unwrap().into();
/// let opr = OperatorRepresentation::new(&hsr, flip);
/// assert_eq!(opr.get(0, 1).unwrap(), Complex64::new(1.0, 0.0));
/// assert_eq!(opr.get(1, 0).unwrap(), Complex64::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct OperatorRepresentation<'a, R: Representation> {
    representation: &'a R,
    operator: Operator<R::BinRep>,
}

impl<'a, R: Representation> OperatorRepresentation<'a, R> {
    pub fn new(representation: &'a R, operator: Operator<R::BinRep>) -> Self {
        Self {
            representation,
            operator,
        }
    }

    #[inline]
    pub fn representation(&self) -> &'a R {
        self.representation
    }

    #[inline]
    pub fn operator(&self) -> &Operator<R::BinRep> {
        &self.operator
    }

    /// Number of rows (and columns)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.representation.dimension()
    }

    /// Matrix element `<row|O|col>` in this basis
    pub fn get(&self, row: usize, col: usize) -> Result<Complex64> {
        let dimension = self.dimension();
        for index in [row, col] {
            if index >= dimension {
                return Err(SimError::IndexOutOfBounds { index, dimension });
            }
        }
        let mut entry = Complex64::new(0.0, 0.0);
        if let Some(bra) = self.representation.basis_state(row) {
            self.operator.for_each_row_term(bra, |ket, amplitude| {
                if let Lookup::Found { index, amplitude: a } = self.representation.lookup(ket) {
                    if index == col {
                        entry += amplitude * a;
                    }
                }
            });
            entry /= self.representation.basis_amplitude(row);
        }
        Ok(entry)
    }

    /// Dense row-major matrix, for small bases
    pub fn to_dense(&self) -> Vec<Vec<Complex64>> {
        let dimension = self.dimension();
        let mut matrix = vec![vec![Complex64::new(0.0, 0.0); dimension]; dimension];
        for (row, values) in matrix.iter_mut().enumerate() {
            let Some(bra) = self.representation.basis_state(row) else {
                continue;
            };
            let norm = self.representation.basis_amplitude(row);
            self.operator.for_each_row_term(bra, |ket, amplitude| {
                if let Lookup::Found { index, amplitude: a } = self.representation.lookup(ket) {
                    values[index] += amplitude * a / norm;
                }
            });
        }
        matrix
    }

    /// `out += O · state` over all rows
    pub fn apply(
        &self,
        out: &mut [Complex64],
        state: &[Complex64],
        config: &ApplyConfig,
    ) -> Result<Leakage> {
        kernel::apply(out, self, state, 0..self.dimension(), config)
    }

    /// `out += state · O` over all columns
    pub fn apply_row(
        &self,
        out: &mut [Complex64],
        state: &[Complex64],
        config: &ApplyConfig,
    ) -> Result<Leakage> {
        kernel::apply_row(out, self, state, 0..self.dimension(), config)
    }

    /// `O · state` as a new vector
    pub fn mul_vec(&self, state: &[Complex64], config: &ApplyConfig) -> Result<(Vec<Complex64>, Leakage)> {
        let mut out = vec![Complex64::new(0.0, 0.0); self.dimension()];
        let leakage = self.apply(&mut out, state, config)?;
        Ok((out, leakage))
    }

    /// Check vector lengths and that `range` lies inside the basis
    pub(crate) fn check_arguments(
        &self,
        out: &[Complex64],
        state: &[Complex64],
        range: &Range<usize>,
    ) -> Result<()> {
        let dimension = self.dimension();
        if out.len() != dimension {
            return Err(SimError::DimensionMismatch {
                what: "output vector",
                expected: dimension,
                actual: out.len(),
            });
        }
        if state.len() != dimension {
            return Err(SimError::DimensionMismatch {
                what: "input vector",
                expected: dimension,
                actual: state.len(),
            });
        }
        if range.start > range.end || range.end > dimension {
            return Err(SimError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                dimension,
            });
        }
        Ok(())
    }
}
