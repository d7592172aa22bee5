#![allow(unused)]

use mini_blas::matrix::Matrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Asserts `a ≈ e` with tolerance scaled by `max(1, |e|)`.
pub fn assert_close(a: f64, e: f64, tol: f64) {
    if e.is_nan() {
        assert!(a.is_nan(), "expected NaN, got {a}");
        return;
    }
    let scale = 1.0_f64.max(e.abs());
    assert!((a - e).abs() <= tol * scale, "mismatch: got {a}, expect {e} (tol={tol})");
}

pub fn assert_slice_close(a: &[f64], e: &[f64], tol: f64) {
    assert_eq!(a.len(), e.len(), "len mismatch");
    for (i, (&ai, &ei)) in a.iter().zip(e).enumerate() {
        let scale = 1.0_f64.max(ei.abs());
        assert!(
            (ai - ei).abs() <= tol * scale,
            "idx {i}: got {ai}, expect {ei} (tol={tol})"
        );
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_vec(len: usize, seed: u64) -> Vec<f64> {
    Matrix::vector_random(len, &mut rng(seed))
        .unwrap()
        .as_slice()
        .to_vec()
}

/// `e₀` of length `n`.
pub fn unit_seed(n: usize) -> Vec<f64> {
    let mut x = vec![0.0; n];
    x[0] = 1.0;
    x
}

/// Triple-loop `A·B` for `A` `l × n` and `B` `n × m`.
pub fn naive_matmul(l: usize, m: usize, n: usize, a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut c = vec![0.0; l * m];
    for i in 0..l {
        for j in 0..m {
            for k in 0..n {
                c[i * m + j] += a[i * n + k] * b[k * m + j];
            }
        }
    }
    c
}

/// `max |QᵀQ − I|` over the first `cols` columns of `q`.
pub fn orthogonality_loss(q: &Matrix, cols: usize) -> f64 {
    let n = q.rows();
    let mut worst = 0.0_f64;
    for i in 0..cols {
        for j in 0..cols {
            let mut dot = 0.0;
            for r in 0..n {
                dot += q.get(r, i) * q.get(r, j);
            }
            let target = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((dot - target).abs());
        }
    }
    worst
}
