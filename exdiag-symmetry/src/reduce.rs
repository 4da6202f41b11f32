//! Momentum-sector reduction of an enumerated basis
//!
//! The parent basis is partitioned into orbits of the translation group. Each
//! orbit that survives projection onto momentum `k` becomes one basis vector
//!
//! ```text
//! |r, k> = Σ_s a_s |s>,   a_s = Σ_{g: g·r = s} φ_g / sqrt(|G| |Stab(r)|)
//! ```
//!
//! with `φ_g = exp(+2πi k·t_g)`. The representative `r` is the smallest bit
//! pattern of the orbit. Orbits whose stabilizer character sum vanishes are
//! projected out, and so are orbits with a member missing from the parent.
//! Such an orbit belongs to the smallest member the parent does contain.

use crate::config::ReductionConfig;
use crate::error::{Result, SymmetryError};
use crate::momentum::{fractional_part, Rational64};
use crate::translation::{check_site_compatibility, permute_bits, TranslationGroup};
use exdiag_core::{BitRep, HilbertSpace, QuantumNumber};
use exdiag_state::{HilbertSpaceRepresentation, Lookup, Representation};
use num_complex::{Complex, Complex64};
use num_traits::{Float, Zero};
use rayon::prelude::*;

/// Basis of one momentum sector, borrowing its parent representation
#[derive(Debug, Clone)]
pub struct ReducedRepresentation<'a, BR, QN, F = f64> {
    parent: &'a HilbertSpaceRepresentation<BR, QN>,
    momentum: Vec<Rational64>,
    basis_list: Vec<BR>,
    basis_amplitudes: Vec<Complex<F>>,
    /// Per parent index: reduced index and amplitude, or `None` if projected out
    parent_mapping: Vec<Option<(usize, Complex<F>)>>,
    leaving_orbits: usize,
}

impl<'a, BR, QN, F> ReducedRepresentation<'a, BR, QN, F>
where
    BR: BitRep,
    QN: QuantumNumber,
    F: Float + Send + Sync,
{
    #[inline]
    pub fn parent(&self) -> &'a HilbertSpaceRepresentation<BR, QN> {
        self.parent
    }

    /// Fractional momentum normalised into `[0, 1)`
    #[inline]
    pub fn momentum(&self) -> &[Rational64] {
        &self.momentum
    }

    /// Number of orbits dropped because part of them lies outside the parent
    #[inline]
    pub fn leaving_orbits(&self) -> usize {
        self.leaving_orbits
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.basis_list.len()
    }

    /// Orbit representatives in ascending order
    #[inline]
    pub fn basis_list(&self) -> &[BR] {
        &self.basis_list
    }

    /// Amplitude of each representative in its own basis vector
    #[inline]
    pub fn basis_amplitudes(&self) -> &[Complex<F>] {
        &self.basis_amplitudes
    }

    /// Reduced index and amplitude of parent basis vector `parent_index`
    #[inline]
    pub fn parent_mapping(&self, parent_index: usize) -> Option<(usize, Complex<F>)> {
        self.parent_mapping.get(parent_index).copied().flatten()
    }

    /// Expand reduced coefficients into the parent basis
    pub fn expand(&self, coefficients: &[Complex<F>]) -> Vec<Complex<F>> {
        self.parent_mapping
            .iter()
            .map(|entry| match entry {
                Some((index, amplitude)) => coefficients
                    .get(*index)
                    .map(|c| *c * *amplitude)
                    .unwrap_or_else(Complex::zero),
                None => Complex::zero(),
            })
            .collect()
    }
}

impl<BR, QN, F> Representation for ReducedRepresentation<'_, BR, QN, F>
where
    BR: BitRep,
    QN: QuantumNumber,
    F: Float + Send + Sync,
{
    type BinRep = BR;
    type QN = QN;

    fn hilbert_space(&self) -> &HilbertSpace<QN> {
        self.parent.hilbert_space()
    }

    fn dimension(&self) -> usize {
        self.basis_list.len()
    }

    fn basis_state(&self, index: usize) -> Option<BR> {
        self.basis_list.get(index).copied()
    }

    fn basis_amplitude(&self, index: usize) -> Complex64 {
        self.basis_amplitudes
            .get(index)
            .map(|a| widen(*a))
            .unwrap_or_else(|| Complex64::new(0.0, 0.0))
    }

    fn lookup(&self, binrep: BR) -> Lookup {
        match self.parent.index_of(binrep) {
            None => Lookup::Missing,
            Some(parent_index) => match self.parent_mapping[parent_index] {
                Some((index, amplitude)) => Lookup::Found {
                    index,
                    amplitude: widen(amplitude),
                },
                None => Lookup::Excluded,
            },
        }
    }
}

/// Reduce `hsr` to momentum sector `momentum` using `config`.
///
/// Returns `Ok(None)` if the momentum is incompatible with the group.
///
/// # Example
///
/// ```
/// use exdiag_core::{HilbertSpace, Site};
/// use exdiag_state::represent;
/// use exdiag_symmetry::{symmetry_reduce, Permutation, Rational64, ReductionConfig, TranslationGroup};
///
/// let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
/// let hs = HilbertSpace::new(vec![spin; 4]);
/// let hsr = represent::<u8, _, _>(&hs).unwrap();
/// let group = TranslationGroup::new(vec![Permutation::new(vec![1, 2, 3, 0]).unwrap()]).unwrap();
///
/// let k0 = [Rational64::from_integer(0)];
/// let reduced = symmetry_reduce(&hsr, &group, &k0, &ReductionConfig::default())
///     .unwrap()
///     .unwrap();
/// assert_eq!(reduced.dimension(), 6);
/// ```
pub fn symmetry_reduce<'a, BR, QN>(
    hsr: &'a HilbertSpaceRepresentation<BR, QN>,
    group: &TranslationGroup,
    momentum: &[Rational64],
    config: &ReductionConfig,
) -> Result<Option<ReducedRepresentation<'a, BR, QN, f64>>>
where
    BR: BitRep,
    QN: QuantumNumber,
{
    symmetry_reduce_with::<f64, BR, QN>(hsr, group, momentum, config)
}

/// Reduce on the calling thread with the default tolerance
pub fn symmetry_reduce_serial<'a, BR, QN>(
    hsr: &'a HilbertSpaceRepresentation<BR, QN>,
    group: &TranslationGroup,
    momentum: &[Rational64],
) -> Result<Option<ReducedRepresentation<'a, BR, QN, f64>>>
where
    BR: BitRep,
    QN: QuantumNumber,
{
    symmetry_reduce_with::<f64, BR, QN>(hsr, group, momentum, &ReductionConfig::serial())
}

/// Reduce with amplitudes stored as `Complex<F>`
///
/// # Errors
/// Fails if the momentum does not have one component per generator, or the
/// group does not act on the sites of `hsr`.
pub fn symmetry_reduce_with<'a, F, BR, QN>(
    hsr: &'a HilbertSpaceRepresentation<BR, QN>,
    group: &TranslationGroup,
    momentum: &[Rational64],
    config: &ReductionConfig,
) -> Result<Option<ReducedRepresentation<'a, BR, QN, F>>>
where
    F: Float + Send + Sync,
    BR: BitRep,
    QN: QuantumNumber,
{
    if momentum.len() != group.generators().len() {
        return Err(SymmetryError::MomentumLengthMismatch {
            expected: group.generators().len(),
            actual: momentum.len(),
        });
    }
    let hs = hsr.hilbert_space();
    for generator in group.generators() {
        check_site_compatibility(hs, generator)?;
    }
    if !group.is_compatible(momentum) {
        tracing::debug!(?momentum, "momentum incompatible with translation group");
        return Ok(None);
    }

    let momentum: Vec<Rational64> = momentum.iter().map(fractional_part).collect();
    let phases: Vec<Complex64> = (0..group.order())
        .map(|element| group.character(&momentum, element))
        .collect();
    let context = OrbitContext {
        hs,
        group,
        phases: &phases,
    };

    let orbits: Vec<Option<Orbit<BR>>> = if config.parallel {
        hsr.basis_list()
            .par_iter()
            .map(|&binrep| context.orbit(binrep).filter(|orbit| orbit.is_owned(hsr)))
            .collect()
    } else {
        let mut visited = vec![false; hsr.dimension()];
        let mut orbits = Vec::with_capacity(hsr.dimension());
        for (index, &binrep) in hsr.basis_list().iter().enumerate() {
            if visited[index] {
                orbits.push(None);
                continue;
            }
            let orbit = context.orbit(binrep).filter(|orbit| orbit.is_owned(hsr));
            if let Some(orbit) = &orbit {
                for (member, _) in &orbit.members {
                    if let Some(j) = hsr.index_of(*member) {
                        visited[j] = true;
                    }
                }
            }
            orbits.push(orbit);
        }
        orbits
    };

    let norm_factor = group.order() as f64;
    let mut basis_list = Vec::new();
    let mut basis_amplitudes = Vec::new();
    let mut parent_mapping = vec![None; hsr.dimension()];
    let mut leaving = 0usize;
    let mut vanishing = 0usize;

    for orbit in orbits.into_iter().flatten() {
        if orbit.stabilizer_sum.norm() < config.tolerance {
            vanishing += 1;
            continue;
        }
        let indices: Option<Vec<usize>> = orbit
            .members
            .iter()
            .map(|(member, _)| hsr.index_of(*member))
            .collect();
        let Some(indices) = indices else {
            leaving += 1;
            continue;
        };

        let norm = (norm_factor * orbit.stabilizer_size as f64).sqrt();
        let reduced_index = basis_list.len();
        let mut representative_amplitude = Complex::zero();
        for ((member, phase_sum), parent_index) in orbit.members.iter().zip(indices) {
            let amplitude = narrow::<F>(*phase_sum / norm);
            if *member == orbit.representative {
                representative_amplitude = amplitude;
            }
            parent_mapping[parent_index] = Some((reduced_index, amplitude));
        }
        basis_list.push(orbit.representative);
        basis_amplitudes.push(representative_amplitude);
    }

    if leaving > 0 {
        tracing::warn!(
            orbits = leaving,
            "dropped orbits that leave the parent basis; the parent is not closed under the group"
        );
    }
    tracing::debug!(
        parent = hsr.dimension(),
        reduced = basis_list.len(),
        vanishing,
        ?momentum,
        "reduced representation"
    );

    Ok(Some(ReducedRepresentation {
        parent: hsr,
        momentum,
        basis_list,
        basis_amplitudes,
        parent_mapping,
        leaving_orbits: leaving,
    }))
}

struct OrbitContext<'g, QN> {
    hs: &'g HilbertSpace<QN>,
    group: &'g TranslationGroup,
    phases: &'g [Complex64],
}

struct Orbit<BR> {
    representative: BR,
    is_minimal: bool,
    /// Distinct members with their summed phases, ascending
    members: Vec<(BR, Complex64)>,
    stabilizer_size: usize,
    stabilizer_sum: Complex64,
}

impl<QN: QuantumNumber> OrbitContext<'_, QN> {
    fn orbit<BR: BitRep>(&self, binrep: BR) -> Option<Orbit<BR>> {
        let mut images: Vec<(BR, Complex64)> = self
            .group
            .elements()
            .iter()
            .zip(self.phases)
            .map(|(element, &phase)| (permute_bits(self.hs, element, binrep), phase))
            .collect();
        if images.is_empty() {
            return None;
        }
        images.sort_by(|a, b| a.0.cmp(&b.0));

        let is_minimal = images[0].0 == binrep;
        let mut stabilizer_size = 0;
        let mut stabilizer_sum = Complex64::new(0.0, 0.0);
        let mut members: Vec<(BR, Complex64)> = Vec::new();
        for (image, phase) in images {
            if image == binrep {
                stabilizer_size += 1;
                stabilizer_sum += phase;
            }
            match members.last_mut() {
                Some((last, sum)) if *last == image => *sum += phase,
                _ => members.push((image, phase)),
            }
        }

        Some(Orbit {
            representative: binrep,
            is_minimal,
            members,
            stabilizer_size,
            stabilizer_sum,
        })
    }
}

impl<BR: BitRep> Orbit<BR> {
    /// Whether the representative is the smallest member present in `hsr`
    fn is_owned<QN: QuantumNumber>(&self, hsr: &HilbertSpaceRepresentation<BR, QN>) -> bool {
        self.is_minimal
            || self
                .members
                .iter()
                .map(|(member, _)| *member)
                .find(|member| hsr.index_of(*member).is_some())
                == Some(self.representative)
    }
}

#[inline]
fn narrow<F: Float>(value: Complex64) -> Complex<F> {
    Complex::new(
        num_traits::cast::<f64, F>(value.re).unwrap_or_else(F::nan),
        num_traits::cast::<f64, F>(value.im).unwrap_or_else(F::nan),
    )
}

#[inline]
fn widen<F: Float>(value: Complex<F>) -> Complex64 {
    Complex64::new(
        value.re.to_f64().unwrap_or(f64::NAN),
        value.im.to_f64().unwrap_or(f64::NAN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use exdiag_core::Site;
    use exdiag_state::represent;
    use crate::permutation::Permutation;

    fn spin_chain(n: usize) -> HilbertSpace<i64> {
        let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
        HilbertSpace::new(vec![spin; n])
    }

    fn chain_group(n: usize) -> TranslationGroup {
        let shift = Permutation::new((0..n).map(|i| (i + 1) % n).collect()).unwrap();
        TranslationGroup::new(vec![shift]).unwrap()
    }

    fn frac(n: i64, d: i64) -> Rational64 {
        Rational64::new(n, d)
    }

    fn zero() -> Rational64 {
        Rational64::from_integer(0)
    }

    #[test]
    fn test_four_site_sectors() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let group = chain_group(4);
        let dims: Vec<usize> = [0, 1, 2, 3]
            .iter()
            .map(|&m| {
                symmetry_reduce_serial(&hsr, &group, &[frac(m, 4)])
                    .unwrap()
                    .unwrap()
                    .dimension()
            })
            .collect();
        assert_eq!(dims, vec![6, 3, 4, 3]);
    }

    #[test]
    fn test_zero_momentum_amplitudes() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let reduced = symmetry_reduce_serial(&hsr, &chain_group(4), &[zero()])
            .unwrap()
            .unwrap();
        assert_eq!(
            reduced.basis_list(),
            &[0b0000, 0b0001, 0b0011, 0b0101, 0b0111, 0b1111]
        );
        // |Stab| = 2 for the Néel orbit
        assert_relative_eq!(reduced.basis_amplitudes()[3].re, 0.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(reduced.basis_amplitudes()[0].re, 1.0, epsilon = 1e-12);

        match reduced.lookup(0b0010) {
            Lookup::Found { index, amplitude } => {
                assert_eq!(index, 1);
                assert_relative_eq!(amplitude.re, 0.5, epsilon = 1e-12);
                assert_relative_eq!(amplitude.im, 0.0, epsilon = 1e-12);
            }
            other => panic!("unexpected lookup {other:?}"),
        }
    }

    #[test]
    fn test_basis_vectors_normalized() {
        let hsr = represent::<u16, _, _>(&spin_chain(6)).unwrap();
        let group = chain_group(6);
        for k in group.fractional_momenta() {
            let reduced = symmetry_reduce_serial(&hsr, &group, k).unwrap().unwrap();
            let mut norms = vec![0.0; reduced.dimension()];
            for i in 0..hsr.dimension() {
                if let Some((index, amplitude)) = reduced.parent_mapping(i) {
                    norms[index] += amplitude.norm_sqr();
                }
            }
            for norm in norms {
                assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_excluded_and_missing() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let reduced = symmetry_reduce_serial(&hsr, &chain_group(4), &[frac(1, 2)])
            .unwrap()
            .unwrap();
        assert_eq!(reduced.lookup(0b0000), Lookup::Excluded);
        assert!(reduced.lookup(0b1010).index().is_some());

        let sector = represent::<u8, _, _>(&spin_chain(4).sector(0)).unwrap();
        let reduced = symmetry_reduce_serial(&sector, &chain_group(4), &[zero()])
            .unwrap()
            .unwrap();
        assert_eq!(reduced.lookup(0b0001), Lookup::Missing);
    }

    #[test]
    fn test_orbit_leaving_parent_dropped() {
        let group = chain_group(4);
        // the single-up orbit is partially present; in the second basis its
        // smallest member 0b0001 is missing too
        for basis in [vec![0b0001u8, 0b0010, 0b0101, 0b1010], vec![0b0010, 0b0101, 0b1010]] {
            let hsr = HilbertSpaceRepresentation::<u8, _>::from_basis(spin_chain(4), basis).unwrap();
            for config in [ReductionConfig::serial(), ReductionConfig::default()] {
                let reduced = symmetry_reduce(&hsr, &group, &[zero()], &config)
                    .unwrap()
                    .unwrap();
                assert_eq!(reduced.basis_list(), &[0b0101]);
                assert_eq!(reduced.leaving_orbits(), 1);
                assert_eq!(reduced.lookup(0b0010), Lookup::Excluded);
            }
        }
    }

    #[test]
    fn test_translated_member_amplitude() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let reduced = symmetry_reduce_serial(&hsr, &chain_group(4), &[frac(1, 4)])
            .unwrap()
            .unwrap();
        assert_eq!(reduced.basis_list(), &[0b0001, 0b0011, 0b0111]);
        assert_eq!(reduced.leaving_orbits(), 0);
        // T|0001> = |0010> carries exp(+iπ/2) / 2
        match reduced.lookup(0b0010) {
            Lookup::Found { index, amplitude } => {
                assert_eq!(index, 0);
                assert_relative_eq!(amplitude.re, 0.0, epsilon = 1e-12);
                assert_relative_eq!(amplitude.im, 0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected lookup {other:?}"),
        }
        match reduced.lookup(0b1000) {
            Lookup::Found { index, amplitude } => {
                assert_eq!(index, 0);
                assert_relative_eq!(amplitude.re, 0.0, epsilon = 1e-12);
                assert_relative_eq!(amplitude.im, -0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected lookup {other:?}"),
        }
    }

    #[test]
    fn test_incompatible_and_invalid_momentum() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let group = chain_group(4);
        assert!(symmetry_reduce_serial(&hsr, &group, &[frac(1, 3)])
            .unwrap()
            .is_none());
        assert_eq!(
            symmetry_reduce_serial(&hsr, &group, &[zero(), zero()]).unwrap_err(),
            SymmetryError::MomentumLengthMismatch {
                expected: 1,
                actual: 2
            }
        );
        assert!(matches!(
            symmetry_reduce_serial(&hsr, &chain_group(5), &[zero()]),
            Err(SymmetryError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_momentum_normalised() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let group = chain_group(4);
        let a = symmetry_reduce_serial(&hsr, &group, &[frac(5, 4)]).unwrap().unwrap();
        let b = symmetry_reduce_serial(&hsr, &group, &[frac(-3, 4)]).unwrap().unwrap();
        assert_eq!(a.momentum(), &[frac(1, 4)]);
        assert_eq!(a.basis_list(), b.basis_list());
        assert_eq!(a.basis_amplitudes(), b.basis_amplitudes());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let hsr = represent::<u32, _, _>(&spin_chain(10).sector(0)).unwrap();
        let group = chain_group(10);
        for k in group.fractional_momenta() {
            let serial = symmetry_reduce_serial(&hsr, &group, k).unwrap().unwrap();
            let parallel = symmetry_reduce(&hsr, &group, k, &ReductionConfig::default())
                .unwrap()
                .unwrap();
            assert_eq!(serial.basis_list(), parallel.basis_list());
            assert_eq!(serial.basis_amplitudes(), parallel.basis_amplitudes());
            for i in 0..hsr.dimension() {
                assert_eq!(serial.parent_mapping(i), parallel.parent_mapping(i));
            }
        }
    }

    #[test]
    fn test_single_precision() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let reduced = symmetry_reduce_with::<f32, _, _>(
            &hsr,
            &chain_group(4),
            &[frac(1, 4)],
            &ReductionConfig::serial(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(reduced.dimension(), 3);
        for amplitude in reduced.basis_amplitudes() {
            assert_relative_eq!(amplitude.norm(), 0.5f32, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_expand() {
        let hsr = represent::<u8, _, _>(&spin_chain(4)).unwrap();
        let reduced = symmetry_reduce_serial(&hsr, &chain_group(4), &[zero()])
            .unwrap()
            .unwrap();
        let mut coefficients = vec![Complex64::new(0.0, 0.0); reduced.dimension()];
        coefficients[3] = Complex64::new(1.0, 0.0);
        let full = reduced.expand(&coefficients);
        let norm: f64 = full.iter().map(|c| c.norm_sqr()).sum();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        assert_relative_eq!(full[0b1010].re, 0.5f64.sqrt(), epsilon = 1e-12);
    }
}
