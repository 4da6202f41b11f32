//! Sparse matrix-vector kernels
//!
//! Both directions gather: every output index pulls the operator entries of
//! its own basis vector, so disjoint output blocks can be filled by separate
//! workers without synchronization.
//!
//! - column form `out += O · state`: output index `r`, row terms of `r`
//! - row form `out += state · O`: output index `c`, column terms of `c`
//!
//! Entries landing outside the representation are summed into a
//! [`Leakage`] instead of being written. The gathered terms are those of the
//! output's own basis vector, so column-form leakage measures whether the
//! basis is closed under `O†`, and row-form leakage whether it is closed
//! under `O`. Both agree for Hermitian operators.

use crate::config::ApplyConfig;
use crate::error::{Result, SimError};
use crate::operator_representation::OperatorRepresentation;
use ahash::AHashMap;
use exdiag_state::{Lookup, Representation, SparseState};
use num_complex::Complex64;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Range};
use std::sync::{Arc, Mutex, OnceLock};

/// Weight of operator entries that left the representation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Leakage {
    /// `Σ |amplitude|`
    pub error: f64,
    /// `Σ |amplitude|²`
    pub error_squared: f64,
}

impl Leakage {
    #[inline]
    fn record(&mut self, amplitude: Complex64) {
        self.error += amplitude.norm();
        self.error_squared += amplitude.norm_sqr();
    }
}

impl Add for Leakage {
    type Output = Leakage;

    fn add(self, rhs: Leakage) -> Leakage {
        Leakage {
            error: self.error + rhs.error,
            error_squared: self.error_squared + rhs.error_squared,
        }
    }
}

impl AddAssign for Leakage {
    fn add_assign(&mut self, rhs: Leakage) {
        *self = *self + rhs;
    }
}

impl Sum for Leakage {
    fn sum<I: Iterator<Item = Leakage>>(iter: I) -> Self {
        iter.fold(Leakage::default(), Add::add)
    }
}

/// Split `0..n` into `blocks` contiguous ranges whose sizes differ by at most one
///
/// Larger blocks come first; `blocks == 0` is treated as one block.
///
/// ```
/// use exdiag_sim::splitblock;
///
/// assert_eq!(splitblock(10, 3), vec![0..4, 4..7, 7..10]);
/// ```
pub fn splitblock(n: usize, blocks: usize) -> Vec<Range<usize>> {
    let blocks = blocks.max(1);
    let base = n / blocks;
    let remainder = n % blocks;
    let mut start = 0;
    (0..blocks)
        .map(|b| {
            let len = base + usize::from(b < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Direction {
    /// `out += O · state`
    Column,
    /// `out += state · O`
    Row,
}

/// `out[range] += (O · state)[range]`, dispatched according to `config`
///
/// The returned [`Leakage`] sums the row terms `<r|O|s>` of each output row
/// `r` whose `s` is missing from the representation. That is weight of
/// `O† |r>` outside the basis; use [`apply_row`] for the weight of `O`.
pub fn apply<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
    config: &ApplyConfig,
) -> Result<Leakage> {
    dispatch(out, opr, state, range, config, Direction::Column)
}

/// `out[range] += (state · O)[range]`, dispatched according to `config`
pub fn apply_row<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
    config: &ApplyConfig,
) -> Result<Leakage> {
    dispatch(out, opr, state, range, config, Direction::Row)
}

/// Column form on the calling thread
pub fn apply_serial<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
) -> Result<Leakage> {
    opr.check_arguments(out, state, &range)?;
    Ok(gather_block(&mut out[range.clone()], range.start, opr, state, Direction::Column))
}

/// Row form on the calling thread
pub fn apply_row_serial<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
) -> Result<Leakage> {
    opr.check_arguments(out, state, &range)?;
    Ok(gather_block(&mut out[range.clone()], range.start, opr, state, Direction::Row))
}

/// Column form, one block per worker of the current rayon pool
pub fn apply_parallel<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
) -> Result<Leakage> {
    opr.check_arguments(out, state, &range)?;
    Ok(run_blocks(out, opr, state, range, rayon::current_num_threads(), Direction::Column))
}

/// Row form, one block per worker of the current rayon pool
pub fn apply_row_parallel<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
) -> Result<Leakage> {
    opr.check_arguments(out, state, &range)?;
    Ok(run_blocks(out, opr, state, range, rayon::current_num_threads(), Direction::Row))
}

fn dispatch<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
    config: &ApplyConfig,
    direction: Direction,
) -> Result<Leakage> {
    opr.check_arguments(out, state, &range)?;

    let leakage = if !config.use_parallel(range.len()) {
        gather_block(&mut out[range.clone()], range.start, opr, state, direction)
    } else if config.num_threads == 0 {
        run_blocks(out, opr, state, range.clone(), rayon::current_num_threads(), direction)
    } else {
        let pool = dedicated_pool(config.num_threads)?;
        let blocks = config.num_threads;
        pool.install(|| run_blocks(out, opr, state, range.clone(), blocks, direction))
    };

    if leakage.error > config.leakage_warning_threshold {
        tracing::warn!(
            error = leakage.error,
            error_squared = leakage.error_squared,
            start = range.start,
            end = range.end,
            "operator leaks out of the representation"
        );
    }
    Ok(leakage)
}

/// Worker pool with `num_threads` threads, built on first request and shared
/// by later calls
fn dedicated_pool(num_threads: usize) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<AHashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .map_err(|_| SimError::ThreadPool {
            reason: "thread pool cache lock poisoned".to_string(),
        })?;
    if let Some(pool) = pools.get(&num_threads) {
        return Ok(Arc::clone(pool));
    }
    let pool = Arc::new(ThreadPoolBuilder::new().num_threads(num_threads).build()?);
    tracing::debug!(num_threads, "built dedicated thread pool");
    pools.insert(num_threads, Arc::clone(&pool));
    Ok(pool)
}

fn run_blocks<R: Representation>(
    out: &mut [Complex64],
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    range: Range<usize>,
    blocks: usize,
    direction: Direction,
) -> Leakage {
    let mut rest = &mut out[range.clone()];
    let mut chunks = Vec::with_capacity(blocks.max(1));
    for block in splitblock(range.len(), blocks) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(block.len());
        chunks.push((range.start + block.start, head));
        rest = tail;
    }

    chunks
        .into_par_iter()
        .map(|(offset, chunk)| gather_block(chunk, offset, opr, state, direction))
        .reduce(Leakage::default, Add::add)
}

/// Fill `out_block`, whose first entry is basis index `offset`
fn gather_block<R: Representation>(
    out_block: &mut [Complex64],
    offset: usize,
    opr: &OperatorRepresentation<'_, R>,
    state: &[Complex64],
    direction: Direction,
) -> Leakage {
    tracing::trace!(offset, len = out_block.len(), "gather block");

    let representation = opr.representation();
    let operator = opr.operator();
    let mut terms = SparseState::new();
    let mut leakage = Leakage::default();

    for (k, slot) in out_block.iter_mut().enumerate() {
        let index = offset + k;
        let Some(binrep) = representation.basis_state(index) else {
            continue;
        };
        terms.clear();
        match direction {
            Direction::Column => operator.row_terms_into(binrep, &mut terms),
            Direction::Row => operator.column_terms_into(binrep, &mut terms),
        }

        let mut sum = Complex64::new(0.0, 0.0);
        for (other, amplitude) in terms.iter() {
            match representation.lookup(other) {
                Lookup::Found {
                    index: j,
                    amplitude: a,
                } => match direction {
                    Direction::Column => sum += amplitude * a * state[j],
                    Direction::Row => sum += state[j] * amplitude * a.conj(),
                },
                Lookup::Excluded => {}
                Lookup::Missing => leakage.record(amplitude),
            }
        }
        *slot += sum / representation.basis_amplitude(index);
    }
    leakage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{pure_operator, Operator};
    use approx::assert_relative_eq;
    use exdiag_core::{HilbertSpace, Site};
    use exdiag_state::represent;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_splitblock() {
        assert_eq!(splitblock(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(splitblock(10, 0), vec![0..10]);
        assert_eq!(splitblock(2, 4), vec![0..1, 1..2, 2..2, 2..2]);
        assert_eq!(splitblock(0, 2), vec![0..0, 0..0]);
        for n in 0..40 {
            for b in 1..9 {
                let blocks = splitblock(n, b);
                assert_eq!(blocks.len(), b);
                assert_eq!(blocks.iter().map(|r| r.len()).sum::<usize>(), n);
                let max = blocks.iter().map(|r| r.len()).max().unwrap();
                let min = blocks.iter().map(|r| r.len()).min().unwrap();
                assert!(max - min <= 1);
                assert!(blocks.windows(2).all(|w| w[0].end == w[1].start));
            }
        }
    }

    fn hopping_setup() -> (HilbertSpace<i64>, Operator<u16>) {
        let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
        let hs = HilbertSpace::new(vec![spin; 8]);
        let one = Complex64::new(1.0, 0.0);
        let op: Operator<u16> = (0..7)
            .map(|i| {
                let up = Operator::from(pure_operator(&hs, i, 0, 1, one).unwrap());
                let down = Operator::from(pure_operator(&hs, i + 1, 1, 0, Complex64::new(0.0, 0.5)).unwrap());
                up * down
            })
            .sum();
        (hs, op)
    }

    fn random_vector(rng: &mut StdRng, n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    #[test]
    fn test_serial_matches_dense() {
        let (hs, op) = hopping_setup();
        let hsr = represent::<u16, _, _>(&hs.sector(2)).unwrap();
        let opr = OperatorRepresentation::new(&hsr, op);
        let dense = opr.to_dense();
        let mut rng = StdRng::seed_from_u64(7);
        let state = random_vector(&mut rng, hsr.dimension());

        let mut out = vec![Complex64::new(0.0, 0.0); hsr.dimension()];
        let leakage = apply_serial(&mut out, &opr, &state, 0..hsr.dimension()).unwrap();
        assert_eq!(leakage, Leakage::default());
        for (row, values) in dense.iter().enumerate() {
            let expected: Complex64 = values.iter().zip(&state).map(|(m, s)| m * s).sum();
            assert_relative_eq!(out[row].re, expected.re, epsilon = 1e-12);
            assert_relative_eq!(out[row].im, expected.im, epsilon = 1e-12);
        }

        let mut out_row = vec![Complex64::new(0.0, 0.0); hsr.dimension()];
        apply_row_serial(&mut out_row, &opr, &state, 0..hsr.dimension()).unwrap();
        for col in 0..hsr.dimension() {
            let expected: Complex64 = (0..hsr.dimension()).map(|r| state[r] * dense[r][col]).sum();
            assert_relative_eq!(out_row[col].re, expected.re, epsilon = 1e-12);
            assert_relative_eq!(out_row[col].im, expected.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (hs, op) = hopping_setup();
        let hsr = represent::<u16, _, _>(&hs).unwrap();
        let opr = OperatorRepresentation::new(&hsr, op);
        let mut rng = StdRng::seed_from_u64(11);
        let state = random_vector(&mut rng, hsr.dimension());
        let range = 17..200;

        let mut serial = vec![Complex64::new(0.0, 0.0); hsr.dimension()];
        let mut parallel = serial.clone();
        apply_serial(&mut serial, &opr, &state, range.clone()).unwrap();
        apply_parallel(&mut parallel, &opr, &state, range.clone()).unwrap();
        for (a, b) in serial.iter().zip(&parallel) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
        // outside the range nothing is touched
        assert!(serial[..17].iter().all(|c| c.norm() == 0.0));
        assert!(serial[200..].iter().all(|c| c.norm() == 0.0));

        for threads in [1, 2, 4] {
            let config = ApplyConfig::parallel().with_num_threads(threads);
            let mut out = vec![Complex64::new(0.0, 0.0); hsr.dimension()];
            apply_row(&mut out, &opr, &state, range.clone(), &config).unwrap();
            let mut reference = vec![Complex64::new(0.0, 0.0); hsr.dimension()];
            apply_row_serial(&mut reference, &opr, &state, range.clone()).unwrap();
            for (a, b) in out.iter().zip(&reference) {
                assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
                assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_dedicated_pool_reused() {
        let first = dedicated_pool(3).unwrap();
        let second = dedicated_pool(3).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.current_num_threads(), 3);
        assert!(!Arc::ptr_eq(&first, &dedicated_pool(2).unwrap()));
    }

    #[test]
    fn test_leakage_out_of_sector() {
        let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
        let hs = HilbertSpace::new(vec![spin; 4]);
        let hsr = represent::<u8, _, _>(&hs.sector(0)).unwrap();
        // S+ on site 0 changes the magnetization
        let raise: Operator<u8> = pure_operator(&hs, 0, 0, 1, Complex64::new(2.0, 0.0))
            .unwrap()
            .into();
        let opr = OperatorRepresentation::new(&hsr, raise);
        let state = vec![Complex64::new(1.0, 0.0); hsr.dimension()];
        let mut out = vec![Complex64::new(0.0, 0.0); hsr.dimension()];

        // three of the six Sz = 0 states have site 0 up; their rows see site 0 down
        let leakage = apply_serial(&mut out, &opr, &state, 0..hsr.dimension()).unwrap();
        assert_relative_eq!(leakage.error, 6.0);
        assert_relative_eq!(leakage.error_squared, 12.0);
        assert!(out.iter().all(|c| c.norm() == 0.0));

        let leakage = apply(&mut out, &opr, &state, 0..hsr.dimension(), &ApplyConfig::parallel()).unwrap();
        assert_relative_eq!(leakage.error, 6.0);
    }

    #[test]
    fn test_accumulates_into_output() {
        let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
        let hs = HilbertSpace::new(vec![spin; 2]);
        let hsr = represent::<u8, _, _>(&hs).unwrap();
        let opr = OperatorRepresentation::new(&hsr, Operator::identity());
        let state = vec![Complex64::new(1.0, 0.0); 4];
        let mut out = vec![Complex64::new(1.0, 0.0); 4];
        apply(&mut out, &opr, &state, 1..3, &ApplyConfig::default()).unwrap();
        let re: Vec<f64> = out.iter().map(|c| c.re).collect();
        assert_eq!(re, vec![1.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_range_errors() {
        let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
        let hs = HilbertSpace::new(vec![spin; 2]);
        let hsr = represent::<u8, _, _>(&hs).unwrap();
        let opr = OperatorRepresentation::new(&hsr, Operator::<u8>::Null);
        let state = vec![Complex64::new(1.0, 0.0); 4];
        let mut out = vec![Complex64::new(0.0, 0.0); 4];
        assert!(apply_serial(&mut out, &opr, &state, 2..5).is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 3..1;
        assert!(apply_parallel(&mut out, &opr, &state, reversed).is_err());
        assert!(apply_row_serial(&mut out, &opr, &state, 0..0).is_ok());
    }
}
