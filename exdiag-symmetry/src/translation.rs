//! Abelian translation groups and their momentum sectors
//!
//! A translation group is generated by commuting permutations `T_1 .. T_N`
//! with orders `R_1 .. R_N`. Every element is `T_1^{t_1} ... T_N^{t_N}` for a
//! translation vector `t`, and the character of momentum `k` on that element
//! is `exp(+2πi k·t)`. A momentum is only well defined if the character is
//! one on every translation vector that yields the identity permutation.

use crate::error::{Result, SymmetryError};
use crate::momentum::{fractional_part, to_f64, Rational64};
use crate::permutation::Permutation;
use ahash::AHashMap;
use exdiag_core::{BitRep, HilbertSpace, QuantumNumber};
use num_complex::Complex64;
use num_traits::Zero;
use std::f64::consts::TAU;

/// Check whether `momentum · identity_translation ≡ 0 (mod 1)`.
///
/// Returns `false` if the lengths differ.
///
/// # Example
///
/// ```
/// use exdiag_symmetry::{is_compatible, Rational64};
///
/// let half = Rational64::new(1, 2);
/// let third = Rational64::new(1, 3);
/// assert!(is_compatible(&[half], &[2]));
/// assert!(!is_compatible(&[third], &[2]));
/// ```
pub fn is_compatible(momentum: &[Rational64], identity_translation: &[i64]) -> bool {
    momentum.len() == identity_translation.len() && phase_fraction(momentum, identity_translation).is_integer()
}

/// `(k · t) mod 1`
fn phase_fraction(momentum: &[Rational64], translation: &[i64]) -> Rational64 {
    let phase = momentum
        .iter()
        .zip(translation)
        .fold(Rational64::zero(), |acc, (&k, &t)| acc + k * t);
    fractional_part(&phase)
}

/// Move the state of site `i` to site `permutation[i]` and repack.
///
/// # Errors
/// Fails if the permutation size differs from the number of sites or maps a
/// site onto a site with different states.
pub fn symmetry_apply<BR: BitRep, QN: QuantumNumber>(
    hs: &HilbertSpace<QN>,
    permutation: &Permutation,
    binrep: BR,
) -> Result<BR> {
    check_site_compatibility(hs, permutation)?;
    Ok(permute_bits(hs, permutation, binrep))
}

/// Check that `permutation` only exchanges equivalent sites of `hs`
pub fn check_site_compatibility<QN: QuantumNumber>(
    hs: &HilbertSpace<QN>,
    permutation: &Permutation,
) -> Result<()> {
    if permutation.len() != hs.num_sites() {
        return Err(SymmetryError::SizeMismatch {
            expected: hs.num_sites(),
            actual: permutation.len(),
        });
    }
    let sites = hs.sites();
    for (from, &to) in permutation.map().iter().enumerate() {
        if sites[from] != sites[to] {
            return Err(SymmetryError::IncompatibleSites { from, to });
        }
    }
    Ok(())
}

/// Permute site fields without checking the sites
///
/// Callers must have validated `permutation` with [`check_site_compatibility`].
#[inline]
pub fn permute_bits<BR: BitRep, QN: QuantumNumber>(
    hs: &HilbertSpace<QN>,
    permutation: &Permutation,
    binrep: BR,
) -> BR {
    let offsets = hs.bitoffsets();
    let mut out = BR::zero();
    for (from, (&width, &to)) in hs.bitwidths().iter().zip(permutation.map()).enumerate() {
        if width == 0 {
            continue;
        }
        let field = (binrep >> offsets[from] as usize) & BR::mask(width);
        out = out | (field << offsets[to] as usize);
    }
    out
}

/// Finite abelian group generated by commuting translations.
///
/// # Example
///
/// ```
/// use exdiag_symmetry::{Permutation, Rational64, TranslationGroup};
///
/// let shift = Permutation::new(vec![1, 2, 3, 0]).unwrap();
/// let group = TranslationGroup::new(vec![shift]).unwrap();
/// assert_eq!(group.order(), 4);
/// assert_eq!(group.fractional_momenta().len(), 4);
/// assert!(group.is_compatible(&[Rational64::new(1, 4)]));
/// assert!(!group.is_compatible(&[Rational64::new(1, 3)]));
/// ```
#[derive(Debug, Clone)]
pub struct TranslationGroup {
    generators: Vec<Permutation>,
    orders: Vec<usize>,
    elements: Vec<Permutation>,
    translations: Vec<Vec<i64>>,
    identity_translations: Vec<Vec<i64>>,
    fractional_momenta: Vec<Vec<Rational64>>,
}

impl TranslationGroup {
    /// Build the group with generator orders taken from their cycle lengths
    pub fn new(generators: Vec<Permutation>) -> Result<Self> {
        let orders = generators.iter().map(Permutation::cycle_length).collect();
        Self::with_orders(generators, orders)
    }

    /// Build the group with explicit generator orders (translation periods)
    ///
    /// # Errors
    /// Fails if there are no generators, sizes differ, an order is zero or
    /// does not return its generator to the identity, or two generators do
    /// not commute.
    pub fn with_orders(generators: Vec<Permutation>, orders: Vec<usize>) -> Result<Self> {
        let first = generators.first().ok_or(SymmetryError::NoGenerators)?;
        let n = first.len();
        if orders.len() != generators.len() {
            return Err(SymmetryError::SizeMismatch {
                expected: generators.len(),
                actual: orders.len(),
            });
        }
        for (i, (g, &order)) in generators.iter().zip(&orders).enumerate() {
            if g.len() != n {
                return Err(SymmetryError::SizeMismatch {
                    expected: n,
                    actual: g.len(),
                });
            }
            if order == 0 || order % g.cycle_length() != 0 {
                return Err(SymmetryError::InvalidOrder {
                    generator: i,
                    order,
                });
            }
        }
        for i in 0..generators.len() {
            for j in (i + 1)..generators.len() {
                let forward = generators[i].try_compose(&generators[j])?;
                let backward = generators[j].try_compose(&generators[i])?;
                if forward != backward {
                    return Err(SymmetryError::NonCommutingGenerators {
                        first: i,
                        second: j,
                    });
                }
            }
        }

        // Walk all translation vectors in mixed radix order
        let mut elements: Vec<Permutation> = Vec::new();
        let mut translations: Vec<Vec<i64>> = Vec::new();
        let mut seen: AHashMap<Vec<usize>, usize> = AHashMap::new();
        let mut identity_translations: Vec<Vec<i64>> = orders
            .iter()
            .enumerate()
            .map(|(i, &order)| {
                let mut t = vec![0i64; orders.len()];
                t[i] = order as i64;
                t
            })
            .collect();

        let total: usize = orders.iter().product();
        let mut t = vec![0usize; orders.len()];
        for _ in 0..total {
            let mut element = Permutation::identity(n);
            for (g, &power) in generators.iter().zip(&t) {
                element = element.try_compose(&g.pow(power as u64))?;
            }
            let translation: Vec<i64> = t.iter().map(|&x| x as i64).collect();
            match seen.get(element.map()) {
                Some(&existing) => {
                    let difference = translation
                        .iter()
                        .zip(&translations[existing])
                        .map(|(a, b)| a - b)
                        .collect();
                    identity_translations.push(difference);
                }
                None => {
                    seen.insert(element.map().to_vec(), elements.len());
                    elements.push(element);
                    translations.push(translation);
                }
            }
            increment_mixed_radix(&mut t, &orders);
        }

        let fractional_momenta = enumerate_momenta(&orders)
            .into_iter()
            .filter(|k| identity_translations.iter().all(|t| is_compatible(k, t)))
            .collect();

        tracing::debug!(
            generators = generators.len(),
            order = elements.len(),
            "built translation group"
        );

        Ok(Self {
            generators,
            orders,
            elements,
            translations,
            identity_translations,
            fractional_momenta,
        })
    }

    #[inline]
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    /// Generator orders (translation periods)
    #[inline]
    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// Distinct group elements; element 0 is the identity
    #[inline]
    pub fn elements(&self) -> &[Permutation] {
        &self.elements
    }

    /// Translation vector of each element
    #[inline]
    pub fn translations(&self) -> &[Vec<i64>] {
        &self.translations
    }

    /// Translation vectors that act as the identity
    #[inline]
    pub fn identity_translations(&self) -> &[Vec<i64>] {
        &self.identity_translations
    }

    /// Number of distinct elements
    #[inline]
    pub fn order(&self) -> usize {
        self.elements.len()
    }

    /// Number of permuted sites
    #[inline]
    pub fn num_sites(&self) -> usize {
        self.generators[0].len()
    }

    /// All momenta `k_i = m_i / R_i` compatible with the group
    #[inline]
    pub fn fractional_momenta(&self) -> &[Vec<Rational64>] {
        &self.fractional_momenta
    }

    /// Whether `momentum` is consistent with every identity translation
    pub fn is_compatible(&self, momentum: &[Rational64]) -> bool {
        momentum.len() == self.generators.len()
            && self
                .identity_translations
                .iter()
                .all(|t| is_compatible(momentum, t))
    }

    /// Character `exp(+2πi k·t)` of element `element` at `momentum`
    pub fn character(&self, momentum: &[Rational64], element: usize) -> Complex64 {
        let phase = to_f64(&phase_fraction(momentum, &self.translations[element]));
        Complex64::from_polar(1.0, TAU * phase)
    }
}

fn increment_mixed_radix(t: &mut [usize], radices: &[usize]) {
    for (digit, &radix) in t.iter_mut().zip(radices) {
        *digit += 1;
        if *digit < radix {
            return;
        }
        *digit = 0;
    }
}

fn enumerate_momenta(orders: &[usize]) -> Vec<Vec<Rational64>> {
    let total: usize = orders.iter().product();
    let mut m = vec![0usize; orders.len()];
    let mut momenta = Vec::with_capacity(total);
    for _ in 0..total {
        momenta.push(
            m.iter()
                .zip(orders)
                .map(|(&mi, &r)| Rational64::new(mi as i64, r as i64))
                .collect(),
        );
        increment_mixed_radix(&mut m, orders);
    }
    momenta
}
