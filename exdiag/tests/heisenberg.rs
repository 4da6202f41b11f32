//! End-to-end checks on the spin-1/2 Heisenberg ring

use approx::assert_relative_eq;
use exdiag::prelude::*;
use exdiag::{apply_serial, ExecutionMode, Lookup};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

fn spin_ring(n: usize) -> HilbertSpace<i64> {
    let spin = Site::from_pairs([("Up", 1i64), ("Dn", -1)]).unwrap();
    HilbertSpace::new(vec![spin; n])
}

fn ring_group(n: usize) -> TranslationGroup {
    let shift = Permutation::new((0..n).map(|i| (i + 1) % n).collect()).unwrap();
    TranslationGroup::new(vec![shift]).unwrap()
}

/// `H = Σ_i S_i · S_{i+1}` with periodic boundary
fn heisenberg(hs: &HilbertSpace<i64>) -> Operator<u64> {
    let n = hs.num_sites();
    let op = |site, row, col, amplitude| -> Operator<u64> {
        pure_operator(hs, site, row, col, amplitude).unwrap().into()
    };
    let sz = |site| op(site, 0, 0, c(0.5)) + op(site, 1, 1, c(-0.5));
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            sz(i) * sz(j)
                + op(i, 0, 1, c(0.5)) * op(j, 1, 0, c(1.0))
                + op(i, 1, 0, c(0.5)) * op(j, 0, 1, c(1.0))
        })
        .sum::<Operator<u64>>()
        .simplify()
}

fn random_vector(rng: &mut StdRng, n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn assert_vectors_close(a: &[Complex64], b: &[Complex64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_relative_eq!(x.re, y.re, epsilon = 1e-10);
        assert_relative_eq!(x.im, y.im, epsilon = 1e-10);
    }
}

#[test]
fn test_hamiltonian_is_translation_invariant() {
    let hs = spin_ring(6);
    assert!(heisenberg(&hs).is_invariant(&hs, &ring_group(6)).unwrap());
}

#[test]
fn test_no_leakage_in_magnetization_sector() {
    let hs = spin_ring(10);
    let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
    assert_eq!(hsr.dimension(), 252);
    let opr = OperatorRepresentation::new(&hsr, heisenberg(&hs));

    let mut rng = StdRng::seed_from_u64(1);
    let state = random_vector(&mut rng, hsr.dimension());
    let mut out = vec![c(0.0); hsr.dimension()];
    let leakage = apply(&mut out, &opr, &state, 0..hsr.dimension(), &ApplyConfig::parallel()).unwrap();
    assert_eq!(leakage.error, 0.0);
    assert_eq!(leakage.error_squared, 0.0);

    let dense = opr.to_dense();
    for i in 0..hsr.dimension() {
        for j in 0..hsr.dimension() {
            assert_relative_eq!(dense[i][j].re, dense[j][i].re, epsilon = 1e-12);
            assert_relative_eq!(dense[i][j].im, -dense[j][i].im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_four_site_zero_momentum_block() {
    let hs = spin_ring(4);
    let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
    let group = ring_group(4);
    let reduced = symmetry_reduce(&hsr, &group, &[Rational64::from_integer(0)], &ReductionConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(reduced.basis_list(), &[0b0011, 0b0101]);

    let block = OperatorRepresentation::new(&reduced, heisenberg(&hs)).to_dense();
    let root2 = 2.0f64.sqrt();
    assert_relative_eq!(block[0][0].re, 0.0, epsilon = 1e-12);
    assert_relative_eq!(block[1][1].re, -1.0, epsilon = 1e-12);
    assert_relative_eq!(block[0][1].re, root2, epsilon = 1e-12);
    assert_relative_eq!(block[1][0].re, root2, epsilon = 1e-12);

    // eigenvalues 1 and -2
    let trace = block[0][0] + block[1][1];
    let det = block[0][0] * block[1][1] - block[0][1] * block[1][0];
    assert_relative_eq!(trace.re, -1.0, epsilon = 1e-12);
    assert_relative_eq!(det.re, -2.0, epsilon = 1e-12);
}

#[test]
fn test_momentum_dimensions_sum_to_parent() {
    let hs = spin_ring(8);
    let group = ring_group(8);
    for sz in [-8i64, -4, -2, 0, 2, 6] {
        let hsr = represent::<u64, _, _>(&hs.sector(sz)).unwrap();
        let total: usize = group
            .fractional_momenta()
            .iter()
            .map(|k| {
                symmetry_reduce(&hsr, &group, k, &ReductionConfig::default())
                    .unwrap()
                    .unwrap()
                    .dimension()
            })
            .sum();
        assert_eq!(total, hsr.dimension(), "sector {sz}");
    }
}

#[test]
fn test_trace_and_frobenius_norm_conserved() {
    let hs = spin_ring(8);
    let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
    let group = ring_group(8);
    let hamiltonian = heisenberg(&hs);

    let full = OperatorRepresentation::new(&hsr, hamiltonian.clone()).to_dense();
    let trace: Complex64 = (0..full.len()).map(|i| full[i][i]).sum();
    let frobenius: f64 = full.iter().flatten().map(|x| x.norm_sqr()).sum();

    let mut trace_sum = c(0.0);
    let mut frobenius_sum = 0.0;
    for k in group.fractional_momenta() {
        let reduced = symmetry_reduce(&hsr, &group, k, &ReductionConfig::default())
            .unwrap()
            .unwrap();
        let block = OperatorRepresentation::new(&reduced, hamiltonian.clone()).to_dense();
        for i in 0..block.len() {
            trace_sum += block[i][i];
            for j in 0..block.len() {
                assert_relative_eq!(block[i][j].re, block[j][i].re, epsilon = 1e-10);
                assert_relative_eq!(block[i][j].im, -block[j][i].im, epsilon = 1e-10);
                frobenius_sum += block[i][j].norm_sqr();
            }
        }
    }

    assert_relative_eq!(trace_sum.re, trace.re, epsilon = 1e-9);
    assert_relative_eq!(trace_sum.im, 0.0, epsilon = 1e-9);
    assert_relative_eq!(frobenius_sum, frobenius, epsilon = 1e-9);
}

#[test]
fn test_reduced_kernel_matches_dense_block() {
    let hs = spin_ring(10);
    let hsr = represent::<u64, _, _>(&hs.sector(2)).unwrap();
    let group = ring_group(10);
    let k = [Rational64::new(3, 10)];
    let reduced = symmetry_reduce(&hsr, &group, &k, &ReductionConfig::default())
        .unwrap()
        .unwrap();
    let opr = OperatorRepresentation::new(&reduced, heisenberg(&hs));
    let dense = opr.to_dense();
    let dim = reduced.dimension();

    let mut rng = StdRng::seed_from_u64(3);
    let state = random_vector(&mut rng, dim);

    let mut column = vec![c(0.0); dim];
    let leakage = apply_serial(&mut column, &opr, &state, 0..dim).unwrap();
    assert_eq!(leakage, Leakage::default());
    let expected: Vec<Complex64> = dense
        .iter()
        .map(|row| row.iter().zip(&state).map(|(m, s)| m * s).sum())
        .collect();
    assert_vectors_close(&column, &expected);

    let mut row = vec![c(0.0); dim];
    apply_row(&mut row, &opr, &state, 0..dim, &ApplyConfig::sequential()).unwrap();
    let expected: Vec<Complex64> = (0..dim)
        .map(|j| (0..dim).map(|i| state[i] * dense[i][j]).sum())
        .collect();
    assert_vectors_close(&row, &expected);
}

#[test]
fn test_serial_and_parallel_agree() {
    let hs = spin_ring(12);
    let hsr = represent::<u64, _, _>(&hs.sector(0)).unwrap();
    let group = ring_group(12);
    let k = [Rational64::new(1, 12)];

    let serial = exdiag::symmetry_reduce_serial(&hsr, &group, &k).unwrap().unwrap();
    let parallel = symmetry_reduce(&hsr, &group, &k, &ReductionConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(serial.basis_list(), parallel.basis_list());
    assert_eq!(serial.basis_amplitudes(), parallel.basis_amplitudes());

    let opr = OperatorRepresentation::new(&parallel, heisenberg(&hs));
    let dim = parallel.dimension();
    let mut rng = StdRng::seed_from_u64(5);
    let state = random_vector(&mut rng, dim);

    let mut reference = vec![c(0.0); dim];
    apply(&mut reference, &opr, &state, 0..dim, &ApplyConfig::sequential()).unwrap();

    for threads in [1, 2, 4] {
        let config = ApplyConfig::new()
            .with_mode(ExecutionMode::Parallel)
            .with_num_threads(threads);
        let mut out = vec![c(0.0); dim];
        let leakage = apply(&mut out, &opr, &state, 0..dim, &config).unwrap();
        assert_eq!(leakage.error, 0.0);
        assert_vectors_close(&out, &reference);
    }
}

#[test]
fn test_linearity() {
    let hs = spin_ring(8);
    let hsr = represent::<u64, _, _>(&hs).unwrap();
    let opr = OperatorRepresentation::new(&hsr, heisenberg(&hs));
    let dim = hsr.dimension();
    let mut rng = StdRng::seed_from_u64(9);
    let x = random_vector(&mut rng, dim);
    let y = random_vector(&mut rng, dim);
    let (a, b) = (Complex64::new(0.3, -1.2), Complex64::new(-2.0, 0.5));

    let combined: Vec<Complex64> = x.iter().zip(&y).map(|(x, y)| a * x + b * y).collect();
    let config = ApplyConfig::default();
    let (hx, _) = opr.mul_vec(&x, &config).unwrap();
    let (hy, _) = opr.mul_vec(&y, &config).unwrap();
    let (h_combined, _) = opr.mul_vec(&combined, &config).unwrap();
    let expected: Vec<Complex64> = hx.iter().zip(&hy).map(|(p, q)| a * p + b * q).collect();
    assert_vectors_close(&h_combined, &expected);
}

#[test]
fn test_null_operator_gives_zero() {
    let hs = spin_ring(6);
    let hsr = represent::<u64, _, _>(&hs).unwrap();
    let opr = OperatorRepresentation::new(&hsr, Operator::Null);
    let state = vec![c(1.0); hsr.dimension()];
    let mut out = vec![c(0.0); hsr.dimension()];
    let leakage = apply(&mut out, &opr, &state, 0..hsr.dimension(), &ApplyConfig::parallel()).unwrap();
    assert_eq!(leakage, Leakage::default());
    assert!(out.iter().all(|x| x.norm() == 0.0));
}

#[test]
fn test_projected_states_are_excluded() {
    let hs = spin_ring(4);
    let hsr = represent::<u64, _, _>(&hs).unwrap();
    let reduced = symmetry_reduce(
        &hsr,
        &ring_group(4),
        &[Rational64::new(1, 4)],
        &ReductionConfig::default(),
    )
    .unwrap()
    .unwrap();
    // the fully polarized state carries no momentum
    assert_eq!(reduced.lookup(0b1111), Lookup::Excluded);
}
