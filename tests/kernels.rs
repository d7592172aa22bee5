// Sequential and parallel kernel families checked against each other and
// against straightforward reference loops.

mod util;

use mini_blas::kernels::backend::Backend;
use mini_blas::kernels::{blas1, blas2, blas3};
use mini_blas::matrix::Matrix;
use util::{assert_close, assert_slice_close, naive_matmul, random_vec, rng};

const SIZES: [usize; 5] = [1, 7, 64, 1000, 4099];

#[test]
fn blas1_known_values() {
    let x = [1.0, 2.0, 3.0];
    let mut y = [1.0, 1.0, 1.0];
    blas1::axpy(3, 2.0, &x, &mut y);
    assert_eq!(y, [3.0, 5.0, 7.0]);
    assert_eq!(blas1::dot(3, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    assert_eq!(blas1::nrm2(2, &[3.0, 4.0]), 5.0);
}

#[test]
fn blas1_families_agree() {
    for (i, &n) in SIZES.iter().enumerate() {
        let x = random_vec(n, i as u64);
        let y = random_vec(n, 100 + i as u64);

        assert_close(blas1::par_dot(n, &x, &y), blas1::dot(n, &x, &y), 1e-9);
        assert_close(blas1::par_nrm2(n, &x), blas1::nrm2(n, &x), 1e-9);
        assert_eq!(blas1::par_max(n, &x), blas1::max(n, &x));

        let mut ys = y.clone();
        let mut yp = y.clone();
        blas1::axpy(n, -0.75, &x, &mut ys);
        blas1::par_axpy(n, -0.75, &x, &mut yp);
        assert_eq!(ys, yp);
    }
}

#[test]
fn nrmf_equals_flat_nrm2() {
    let a = Matrix::random(13, 17, &mut rng(1)).unwrap();
    let flat = blas1::nrm2(a.len(), a.as_slice());
    assert_close(blas1::nrmf(13, 17, a.as_slice()), flat, 1e-12);
    assert_close(blas1::par_nrmf(13, 17, a.as_slice()), flat, 1e-12);
}

#[test]
fn max_with_all_negative_values() {
    let x: Vec<f64> = (1..=100).map(|v| -(v as f64)).collect();
    assert_eq!(blas1::max(100, &x), -1.0);
    assert_eq!(blas1::par_max(100, &x), -1.0);
}

#[test]
fn gemv_matches_naive_and_transposed_storage() {
    for &(m, n) in &[(1, 1), (3, 5), (64, 17), (257, 129)] {
        let mut r = rng((m * 1000 + n) as u64);
        let a = Matrix::random(m, n, &mut r).unwrap();
        let at = a.transposed().unwrap();
        let x = Matrix::vector_random(n, &mut r).unwrap();
        let y0 = Matrix::vector_random(m, &mut r).unwrap();

        let mut expected = naive_matmul(m, 1, n, a.as_slice(), x.as_slice());
        for (e, &y) in expected.iter_mut().zip(y0.as_slice()) {
            *e = 1.5 * *e - 0.5 * y;
        }

        for backend in [Backend::Sequential, Backend::Parallel] {
            let mut y = y0.copy().unwrap();
            backend
                .gemv(m, n, 1.5, a.as_slice(), x.as_slice(), -0.5, y.as_mut_slice())
                .unwrap();
            assert_slice_close(y.as_slice(), &expected, 1e-10);

            let mut y = y0.copy().unwrap();
            backend
                .gemv_transposed(m, n, 1.5, at.as_slice(), x.as_slice(), -0.5, y.as_mut_slice())
                .unwrap();
            assert_slice_close(y.as_slice(), &expected, 1e-10);
        }
    }
}

#[test]
fn ger_families_agree() {
    let (m, n) = (33, 65);
    let mut r = rng(11);
    let a0 = Matrix::random(m, n, &mut r).unwrap();
    let x = random_vec(m, 12);
    let yt = random_vec(n, 13);
    let mut seq = a0.copy().unwrap();
    let mut par = a0.copy().unwrap();
    blas2::ger(m, n, 0.3, seq.as_mut_slice(), &x, &yt).unwrap();
    blas2::par_ger(m, n, 0.3, par.as_mut_slice(), &x, &yt).unwrap();
    assert_eq!(seq.as_slice(), par.as_slice());
    assert_close(seq.get(4, 9), a0.get(4, 9) + 0.3 * x[4] * yt[9], 1e-14);
}

#[test]
fn gemm_matches_naive_for_rectangular_shapes() {
    for &(l, m, n) in &[(1, 1, 1), (2, 5, 3), (31, 17, 9), (64, 64, 64)] {
        let mut r = rng((l * 10_000 + m * 100 + n) as u64);
        let a = Matrix::random(l, n, &mut r).unwrap();
        let b = Matrix::random(n, m, &mut r).unwrap();
        let bt = b.transposed().unwrap();
        let c0 = Matrix::random(l, m, &mut r).unwrap();

        let mut expected = naive_matmul(l, m, n, a.as_slice(), b.as_slice());
        for (e, &c) in expected.iter_mut().zip(c0.as_slice()) {
            *e = 0.5 * *e + 2.0 * c;
        }

        for backend in [Backend::Sequential, Backend::Parallel] {
            let mut c = c0.copy().unwrap();
            backend
                .gemm(l, m, n, 0.5, a.as_slice(), b.as_slice(), 2.0, c.as_mut_slice())
                .unwrap();
            assert_slice_close(c.as_slice(), &expected, 1e-10);

            let mut c = c0.copy().unwrap();
            backend
                .gemm_transposed_b(l, m, n, 0.5, a.as_slice(), bt.as_slice(), 2.0, c.as_mut_slice())
                .unwrap();
            assert_slice_close(c.as_slice(), &expected, 1e-10);
        }
    }
}

#[test]
fn gemm_alpha_zero_scales_exactly() {
    let mut r = rng(5);
    let a = Matrix::random(8, 8, &mut r).unwrap();
    let b = Matrix::random(8, 8, &mut r).unwrap();
    let c0 = Matrix::random(8, 8, &mut r).unwrap();

    let mut c = c0.copy().unwrap();
    blas3::gemm(8, 8, 8, 0.0, a.as_slice(), b.as_slice(), 0.0, c.as_mut_slice()).unwrap();
    assert!(c.as_slice().iter().all(|&v| v == 0.0));

    let mut c = c0.copy().unwrap();
    blas3::par_gemm(8, 8, 8, 0.0, a.as_slice(), b.as_slice(), -3.0, c.as_mut_slice()).unwrap();
    for (&got, &old) in c.as_slice().iter().zip(c0.as_slice()) {
        assert_eq!(got, -3.0 * old);
    }
}

#[test]
fn parallel_kernels_respect_an_installed_pool() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
    let x = random_vec(10_000, 21);
    let y = random_vec(10_000, 22);
    let seq = blas1::dot(10_000, &x, &y);
    let par = pool.install(|| blas1::par_dot(10_000, &x, &y));
    assert_close(par, seq, 1e-9);
}
