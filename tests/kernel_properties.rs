//! Property-based tests for the BLAS kernels.
//!
//! Algebraic identities that must hold for any operand values, plus
//! sequential/parallel agreement over arbitrary lengths.

use mini_blas::kernels::{blas1, blas2, blas3};
use mini_blas::stats::{Stats, Workload};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = f64> {
    -1.0e3f64..1.0e3
}

/// A non-empty vector of bounded values.
fn arb_vec(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_value(), 1..=max_len)
}

/// Two vectors of the same length.
fn arb_pair(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..=max_len).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_value(), n),
            prop::collection::vec(arb_value(), n),
        )
    })
}

/// `(m, n, A, x)` with `A` `m × n` row-major.
fn arb_gemv() -> impl Strategy<Value = (usize, usize, Vec<f64>, Vec<f64>)> {
    (1usize..=24, 1usize..=24).prop_flat_map(|(m, n)| {
        (
            Just(m),
            Just(n),
            prop::collection::vec(-1.0f64..1.0, m * n),
            prop::collection::vec(-1.0f64..1.0, n),
        )
    })
}

/// Positive latencies as produced by the timer.
fn arb_samples() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1.0e9, 1..=31)
}

fn tol(scale: f64) -> f64 {
    1e-12 * scale.max(1.0)
}

// ── Property tests ───────────────────────────────────────────────────────────

proptest! {
    /// `x · y == y · x` and both families agree.
    #[test]
    fn dot_is_symmetric((x, y) in arb_pair(2048)) {
        let n = x.len();
        let xy = blas1::dot(n, &x, &y);
        let yx = blas1::dot(n, &y, &x);
        let scale: f64 = x.iter().zip(&y).map(|(a, b)| (a * b).abs()).sum();
        prop_assert!((xy - yx).abs() <= tol(scale));
        prop_assert!((blas1::par_dot(n, &x, &y) - xy).abs() <= tol(scale));
    }

    /// `||x||₂² == x · x`.
    #[test]
    fn nrm2_squared_is_self_dot(x in arb_vec(2048)) {
        let n = x.len();
        let norm = blas1::nrm2(n, &x);
        let dot = blas1::dot(n, &x, &x);
        prop_assert!(norm >= 0.0);
        prop_assert!((norm * norm - dot).abs() <= 1e-10 * dot.max(1.0));
        prop_assert!((blas1::par_nrm2(n, &x) - norm).abs() <= 1e-10 * norm.max(1.0));
    }

    /// The maximum is an element and bounds every element.
    #[test]
    fn max_bounds_every_element(x in arb_vec(4096)) {
        let n = x.len();
        let m = blas1::max(n, &x);
        prop_assert!(x.iter().all(|&v| v <= m));
        prop_assert!(x.contains(&m));
        prop_assert_eq!(blas1::par_max(n, &x), m);
    }

    /// `axpy` with `a = 0` leaves `y` untouched; both families agree otherwise.
    #[test]
    fn axpy_families_agree((x, y) in arb_pair(2048), a in arb_value()) {
        let n = x.len();
        let mut y0 = y.clone();
        blas1::axpy(n, 0.0, &x, &mut y0);
        prop_assert_eq!(&y0, &y);

        let mut ys = y.clone();
        let mut yp = y.clone();
        blas1::axpy(n, a, &x, &mut ys);
        blas1::par_axpy(n, a, &x, &mut yp);
        prop_assert_eq!(ys, yp);
    }

    /// Plain and transposed-storage GEMV compute the same product.
    #[test]
    fn gemv_storage_orders_agree((m, n, a, x) in arb_gemv(), alpha in -2.0f64..2.0) {
        let mut at = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                at[j * m + i] = a[i * n + j];
            }
        }
        let mut y1 = vec![0.0; m];
        let mut y2 = vec![0.0; m];
        let mut y3 = vec![0.0; m];
        blas2::gemv(m, n, alpha, &a, &x, 0.0, &mut y1).unwrap();
        blas2::gemv_transposed(m, n, alpha, &at, &x, 0.0, &mut y2).unwrap();
        blas2::par_gemv_transposed(m, n, alpha, &at, &x, 0.0, &mut y3).unwrap();
        for i in 0..m {
            prop_assert!((y1[i] - y2[i]).abs() <= 1e-12 * (n as f64));
            prop_assert!((y1[i] - y3[i]).abs() <= 1e-12 * (n as f64));
        }
    }

    /// `A·I == A` for both GEMM families.
    #[test]
    fn gemm_by_identity_is_exact((m, n, a, _x) in arb_gemv()) {
        let mut id = vec![0.0; n * n];
        for i in 0..n {
            id[i * n + i] = 1.0;
        }
        let mut c = vec![0.0; m * n];
        blas3::gemm(m, n, n, 1.0, &a, &id, 0.0, &mut c).unwrap();
        prop_assert_eq!(&c, &a);

        let mut c = vec![0.0; m * n];
        blas3::par_gemm_transposed_b(m, n, n, 1.0, &a, &id, 0.0, &mut c).unwrap();
        prop_assert_eq!(&c, &a);
    }

    /// `min ≤ median ≤ max` and `min ≤ mean ≤ max`.
    #[test]
    fn stats_are_ordered(samples in arb_samples()) {
        let stats = Stats::compute("prop", Workload::Krylov { size: 1 }, &samples).unwrap();
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.min <= stats.mean * (1.0 + 1e-12));
        prop_assert!(stats.mean <= stats.max * (1.0 + 1e-12));
        prop_assert!(stats.stddevp >= 0.0);
    }
}
