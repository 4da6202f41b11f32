//! Permutations of lattice sites
//!
//! Permutations are stored as 0-based image arrays: `map[x]` is where `x`
//! goes. Products apply the left operand first, so `(p1 * p2).apply(x) ==
//! p2.apply(p1.apply(x))`.

use crate::error::{Result, SymmetryError};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;

/// Default bound on the cycle length of a permutation
pub const DEFAULT_MAX_CYCLE: usize = 2048;

/// A bijection on `0..n` together with its cycle length (order).
///
/// Equality and hashing compare the image arrays only.
///
/// # Example
///
/// ```
/// use exdiag_symmetry::Permutation;
///
/// let p1 = Permutation::new(vec![0, 2, 1]).unwrap();
/// let p2 = Permutation::new(vec![1, 0, 2]).unwrap();
/// assert_eq!((&p1 * &p2).map(), &[1, 2, 0]);
/// assert_eq!((&p2 * &p1).map(), &[2, 0, 1]);
///
/// let shift = Permutation::new(vec![1, 2, 3, 0]).unwrap();
/// assert_eq!(shift.pow(2).map(), &[2, 3, 0, 1]);
/// assert_eq!(shift.cycle_length(), 4);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permutation {
    map: Vec<usize>,
    cycle_length: usize,
    max_cycle: usize,
}

impl PartialEq for Permutation {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl Eq for Permutation {}

impl Hash for Permutation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl Permutation {
    /// Create a permutation with the default cycle bound
    ///
    /// # Errors
    /// Fails if `map` is not a permutation of `0..map.len()` or its cycle
    /// length exceeds [`DEFAULT_MAX_CYCLE`]
    pub fn new(map: Vec<usize>) -> Result<Self> {
        Self::with_max_cycle(map, DEFAULT_MAX_CYCLE)
    }

    /// Create a permutation whose cycle length may not exceed `max_cycle`
    pub fn with_max_cycle(map: Vec<usize>, max_cycle: usize) -> Result<Self> {
        let n = map.len();
        let mut seen = vec![false; n];
        for &image in &map {
            if image >= n || seen[image] {
                return Err(SymmetryError::InvalidPermutation { map });
            }
            seen[image] = true;
        }

        let cycle_length = detect_cycle_length(&map, max_cycle)?;
        Ok(Self {
            map,
            cycle_length,
            max_cycle,
        })
    }

    /// Identity permutation on `0..n`
    pub fn identity(n: usize) -> Self {
        Self {
            map: (0..n).collect(),
            cycle_length: 1,
            max_cycle: DEFAULT_MAX_CYCLE,
        }
    }

    /// Number of permuted elements
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Image array
    #[inline]
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Image of `x`
    #[inline]
    pub fn apply(&self, x: usize) -> usize {
        self.map[x]
    }

    /// Smallest `k > 0` with `self^k == identity`
    #[inline]
    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    #[inline]
    pub fn max_cycle(&self) -> usize {
        self.max_cycle
    }

    pub fn is_identity(&self) -> bool {
        is_identity_map(&self.map)
    }

    /// Product applying `self` first, then `other`
    ///
    /// # Errors
    /// Fails on a size mismatch or if the product's cycle length exceeds the
    /// larger of the two operands' bounds
    pub fn try_compose(&self, other: &Permutation) -> Result<Permutation> {
        if self.len() != other.len() {
            return Err(SymmetryError::SizeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        let map = compose_maps(&self.map, &other.map);
        let max_cycle = self.max_cycle.max(other.max_cycle);
        let cycle_length = detect_cycle_length(&map, max_cycle)?;
        Ok(Permutation {
            map,
            cycle_length,
            max_cycle,
        })
    }

    /// Inverse permutation
    pub fn inverse(&self) -> Permutation {
        let mut map = vec![0; self.len()];
        for (x, &image) in self.map.iter().enumerate() {
            map[image] = x;
        }
        Permutation {
            map,
            cycle_length: self.cycle_length,
            max_cycle: self.max_cycle,
        }
    }

    /// `self` composed with itself `exponent` times; `pow(0)` is the identity
    pub fn pow(&self, exponent: u64) -> Permutation {
        let reduced = (exponent % self.cycle_length as u64) as usize;
        let mut map: Vec<usize> = (0..self.len()).collect();
        for _ in 0..reduced {
            map = compose_maps(&map, &self.map);
        }
        let cycle_length = self.cycle_length / gcd(self.cycle_length, reduced);
        Permutation {
            map,
            cycle_length,
            max_cycle: self.max_cycle,
        }
    }
}

/// Composes two permutations.
///
/// # Panics
/// Panics on a size mismatch or when the product exceeds its cycle bound;
/// use [`Permutation::try_compose`] to handle these cases.
impl Mul<&Permutation> for &Permutation {
    type Output = Permutation;

    fn mul(self, rhs: &Permutation) -> Permutation {
        match self.try_compose(rhs) {
            Ok(product) => product,
            Err(e) => panic!("cannot compose permutations: {}", e),
        }
    }
}

impl Mul for Permutation {
    type Output = Permutation;

    fn mul(self, rhs: Permutation) -> Permutation {
        &self * &rhs
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permutation({:?}, {})", self.map, self.cycle_length)
    }
}

#[inline]
fn compose_maps(first: &[usize], second: &[usize]) -> Vec<usize> {
    first.iter().map(|&x| second[x]).collect()
}

fn is_identity_map(map: &[usize]) -> bool {
    map.iter().enumerate().all(|(x, &image)| x == image)
}

/// Iterate powers of `map` until the identity recurs
fn detect_cycle_length(map: &[usize], max_cycle: usize) -> Result<usize> {
    let mut power = map.to_vec();
    let mut length = 1;
    while !is_identity_map(&power) {
        length += 1;
        if length > max_cycle {
            return Err(SymmetryError::CycleTooLong { max_cycle });
        }
        power = compose_maps(&power, map);
    }
    Ok(length)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
