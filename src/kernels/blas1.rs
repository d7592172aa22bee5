// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **BLAS Level 1 Kernels** - *Vector-Vector Operations and Reductions*
//!
//! Sequential and data-parallel implementations of the vector kernels:
//! - **AXPY**: `y ← a·x + y`
//! - **DOT**: `Σ xᵢ·yᵢ`
//! - **NRM2**: `sqrt(Σ xᵢ²)`
//! - **NRMF**: Frobenius norm of a row-major matrix buffer
//! - **MAX**: largest element
//!
//! The `par_*` variants split the loop across the rayon pool the caller is
//! running in. Reductions combine partial results with `sum` / `max`, so the
//! parallel result does not depend on which worker handled which chunk, up to
//! floating-point summation order.
//!
//! With the `simd` feature, the sequential `dot` and `nrm2` take a
//! `std::simd` path when both buffers are 64-byte aligned.
//!
//! All kernels assert that the buffers hold at least `n` elements.

#[cfg(feature = "simd")]
use std::simd::{Simd, num::SimdFloat};

use rayon::prelude::*;

#[cfg(feature = "simd")]
use crate::utils::{W64, is_simd_aligned};

/// Scaled vector addition: `y ← a·x + y`.
#[inline(always)]
pub fn axpy(n: usize, a: f64, x: &[f64], y: &mut [f64]) {
    assert!(x.len() >= n && y.len() >= n, "axpy: buffers shorter than n");
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi += a * xi;
    }
}

/// Parallel `y ← a·x + y`.
#[inline]
pub fn par_axpy(n: usize, a: f64, x: &[f64], y: &mut [f64]) {
    assert!(x.len() >= n && y.len() >= n, "par_axpy: buffers shorter than n");
    y[..n]
        .par_iter_mut()
        .zip(x[..n].par_iter())
        .for_each(|(yi, &xi)| *yi += a * xi);
}

/// Dot product `Σ xᵢ·yᵢ`, accumulated in double precision.
#[inline(always)]
pub fn dot(n: usize, x: &[f64], y: &[f64]) -> f64 {
    assert!(x.len() >= n && y.len() >= n, "dot: buffers shorter than n");
    let (x, y) = (&x[..n], &y[..n]);

    #[cfg(feature = "simd")]
    if is_simd_aligned(x) && is_simd_aligned(y) {
        const N: usize = W64;
        let mut acc = Simd::<f64, N>::splat(0.0);
        let mut i = 0;
        while i + N <= n {
            let a = Simd::<f64, N>::from_slice(&x[i..i + N]);
            let b = Simd::<f64, N>::from_slice(&y[i..i + N]);
            acc += a * b;
            i += N;
        }
        let mut res = acc.reduce_sum();
        // tail
        for j in i..n {
            res += x[j] * y[j];
        }
        return res;
    }

    let mut res = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        res += xi * yi;
    }
    res
}

/// Parallel dot product; partial sums are reduced with `+`.
#[inline]
pub fn par_dot(n: usize, x: &[f64], y: &[f64]) -> f64 {
    assert!(x.len() >= n && y.len() >= n, "par_dot: buffers shorter than n");
    x[..n]
        .par_iter()
        .zip(y[..n].par_iter())
        .map(|(&xi, &yi)| xi * yi)
        .sum()
}

/// Euclidean norm `sqrt(Σ xᵢ²)`.
#[inline(always)]
pub fn nrm2(n: usize, x: &[f64]) -> f64 {
    assert!(x.len() >= n, "nrm2: buffer shorter than n");
    let x = &x[..n];

    #[cfg(feature = "simd")]
    if is_simd_aligned(x) {
        const N: usize = W64;
        let mut acc = Simd::<f64, N>::splat(0.0);
        let mut i = 0;
        while i + N <= n {
            let v = Simd::<f64, N>::from_slice(&x[i..i + N]);
            acc += v * v;
            i += N;
        }
        let mut res = acc.reduce_sum();
        for &v in &x[i..] {
            res += v * v;
        }
        return res.sqrt();
    }

    let mut res = 0.0;
    for &v in x {
        res += v * v;
    }
    res.sqrt()
}

/// Parallel Euclidean norm.
#[inline]
pub fn par_nrm2(n: usize, x: &[f64]) -> f64 {
    assert!(x.len() >= n, "par_nrm2: buffer shorter than n");
    x[..n].par_iter().map(|&v| v * v).sum::<f64>().sqrt()
}

/// Frobenius norm of a `rows × cols` row-major buffer.
#[inline(always)]
pub fn nrmf(rows: usize, cols: usize, a: &[f64]) -> f64 {
    let len = rows * cols;
    assert!(a.len() >= len, "nrmf: buffer shorter than rows * cols");
    let mut res = 0.0;
    for row in a[..len].chunks_exact(cols.max(1)) {
        for &v in row {
            res += (v * v).abs();
        }
    }
    res.sqrt()
}

/// Parallel Frobenius norm, one partial sum per row.
#[inline]
pub fn par_nrmf(rows: usize, cols: usize, a: &[f64]) -> f64 {
    let len = rows * cols;
    assert!(a.len() >= len, "par_nrmf: buffer shorter than rows * cols");
    a[..len]
        .par_chunks(cols.max(1))
        .map(|row| row.iter().map(|&v| (v * v).abs()).sum::<f64>())
        .sum::<f64>()
        .sqrt()
}

/// Largest element, seeded with `x[0]`.
///
/// `n` must be at least 1.
#[inline(always)]
pub fn max(n: usize, x: &[f64]) -> f64 {
    assert!(n >= 1, "max: n must be at least 1");
    assert!(x.len() >= n, "max: buffer shorter than n");
    let mut res = x[0];
    for &v in &x[..n] {
        res = if v > res { v } else { res };
    }
    res
}

/// Parallel maximum; partial maxima are reduced with the same comparison.
#[inline]
pub fn par_max(n: usize, x: &[f64]) -> f64 {
    assert!(n >= 1, "par_max: n must be at least 1");
    assert!(x.len() >= n, "par_max: buffer shorter than n");
    let seed = x[0];
    x[..n]
        .par_iter()
        .copied()
        .reduce(|| seed, |a, b| if b > a { b } else { a })
}
