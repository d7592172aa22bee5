// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Kernel Backend** - *Sequential / Parallel Dispatch*
//!
//! [`Backend`] selects which family of kernels a caller runs, so that the
//! Krylov engine and the drivers can be written once against either.
//! The parallel family uses whichever rayon pool the call is installed in.

use crate::errors::KernelError;
use crate::kernels::{blas1, blas2, blas3};

/// Kernel family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sequential,
    Parallel,
}

impl Backend {
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Backend::Parallel)
    }

    #[inline]
    pub fn axpy(self, n: usize, a: f64, x: &[f64], y: &mut [f64]) {
        match self {
            Backend::Sequential => blas1::axpy(n, a, x, y),
            Backend::Parallel => blas1::par_axpy(n, a, x, y),
        }
    }

    #[inline]
    pub fn dot(self, n: usize, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Backend::Sequential => blas1::dot(n, x, y),
            Backend::Parallel => blas1::par_dot(n, x, y),
        }
    }

    #[inline]
    pub fn nrm2(self, n: usize, x: &[f64]) -> f64 {
        match self {
            Backend::Sequential => blas1::nrm2(n, x),
            Backend::Parallel => blas1::par_nrm2(n, x),
        }
    }

    #[inline]
    pub fn nrmf(self, rows: usize, cols: usize, a: &[f64]) -> f64 {
        match self {
            Backend::Sequential => blas1::nrmf(rows, cols, a),
            Backend::Parallel => blas1::par_nrmf(rows, cols, a),
        }
    }

    #[inline]
    pub fn max(self, n: usize, x: &[f64]) -> f64 {
        match self {
            Backend::Sequential => blas1::max(n, x),
            Backend::Parallel => blas1::par_max(n, x),
        }
    }

    #[inline]
    pub fn gemv(
        self,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        x: &[f64],
        beta: f64,
        y: &mut [f64],
    ) -> Result<(), KernelError> {
        match self {
            Backend::Sequential => blas2::gemv(m, n, alpha, a, x, beta, y),
            Backend::Parallel => blas2::par_gemv(m, n, alpha, a, x, beta, y),
        }
    }

    #[inline]
    pub fn gemv_transposed(
        self,
        m: usize,
        n: usize,
        alpha: f64,
        at: &[f64],
        x: &[f64],
        beta: f64,
        y: &mut [f64],
    ) -> Result<(), KernelError> {
        match self {
            Backend::Sequential => blas2::gemv_transposed(m, n, alpha, at, x, beta, y),
            Backend::Parallel => blas2::par_gemv_transposed(m, n, alpha, at, x, beta, y),
        }
    }

    #[inline]
    pub fn ger(
        self,
        m: usize,
        n: usize,
        alpha: f64,
        a: &mut [f64],
        x: &[f64],
        yt: &[f64],
    ) -> Result<(), KernelError> {
        match self {
            Backend::Sequential => blas2::ger(m, n, alpha, a, x, yt),
            Backend::Parallel => blas2::par_ger(m, n, alpha, a, x, yt),
        }
    }

    #[inline]
    pub fn gemm(
        self,
        l: usize,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        b: &[f64],
        beta: f64,
        c: &mut [f64],
    ) -> Result<(), KernelError> {
        match self {
            Backend::Sequential => blas3::gemm(l, m, n, alpha, a, b, beta, c),
            Backend::Parallel => blas3::par_gemm(l, m, n, alpha, a, b, beta, c),
        }
    }

    #[inline]
    pub fn gemm_transposed_b(
        self,
        l: usize,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        bt: &[f64],
        beta: f64,
        c: &mut [f64],
    ) -> Result<(), KernelError> {
        match self {
            Backend::Sequential => blas3::gemm_transposed_b(l, m, n, alpha, a, bt, beta, c),
            Backend::Parallel => blas3::par_gemm_transposed_b(l, m, n, alpha, a, bt, beta, c),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sequential => write!(f, "sequential"),
            Backend::Parallel => write!(f, "parallel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sequential() {
        assert_eq!(Backend::default(), Backend::Sequential);
        assert!(Backend::Parallel.is_parallel());
        assert_eq!(Backend::Parallel.to_string(), "parallel");
    }

    #[test]
    fn both_families_compute_the_same_thing() {
        let x: Vec<f64> = (0..257).map(|i| (i as f64).sin()).collect();
        let y: Vec<f64> = (0..257).map(|i| (i as f64).cos()).collect();
        let s = Backend::Sequential;
        let p = Backend::Parallel;
        assert!((s.dot(257, &x, &y) - p.dot(257, &x, &y)).abs() < 1e-12);
        assert!((s.nrm2(257, &x) - p.nrm2(257, &x)).abs() < 1e-12);
        assert_eq!(s.max(257, &x), p.max(257, &x));
    }
}
