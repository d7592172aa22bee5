// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **BLAS Level 2 Kernels** - *Matrix-Vector Operations*
//!
//! Row-major matrix-vector kernels, each with a rayon `par_*` twin:
//! - **GEMV**: `y ← α·A·x + β·y`, `A` is `m × n`
//! - **GEMV (transposed storage)**: the same product with `A` supplied as `Aᵀ`
//!   (`n × m`), walking `A` column by column
//! - **GER**: rank-1 update `A ← A + α·x·yᵀ`
//!
//! ## Preconditions
//! Checked in this order:
//! 1. any empty buffer: the call does nothing and returns `Ok(())`
//! 2. any zero extent: `KernelError::InvalidArguments`
//! 3. any buffer shorter than its extents: `KernelError::LengthMismatch`
//!
//! When `β == 0` the previous contents of `y` are not read.

use rayon::prelude::*;

use crate::errors::KernelError;
use crate::utils::{confirm_min_len, confirm_nonzero_dims, has_empty};

/// Validates a GEMV call; `Ok(false)` means there is nothing to compute.
#[inline(always)]
fn gemv_args(
    fname: &str,
    m: usize,
    n: usize,
    a: &[f64],
    x: &[f64],
    y: &[f64],
) -> Result<bool, KernelError> {
    if has_empty(&[a.len(), x.len(), y.len()]) {
        return Ok(false);
    }
    confirm_nonzero_dims(fname, &[m, n])?;
    confirm_min_len(fname, "a", a.len(), m.saturating_mul(n))?;
    confirm_min_len(fname, "x", x.len(), n)?;
    confirm_min_len(fname, "y", y.len(), m)?;
    Ok(true)
}

#[inline(always)]
fn scale_acc(alpha: f64, acc: f64, beta: f64, y: f64) -> f64 {
    if beta == 0.0 {
        alpha * acc
    } else {
        alpha * acc + beta * y
    }
}

/// General matrix-vector product `y ← α·A·x + β·y`.
///
/// `A` is `m × n` row-major, `x` holds `n` elements and `y` holds `m`.
/// Each output element is the dot product of one row of `A` with `x`.
#[inline(always)]
pub fn gemv(
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) -> Result<(), KernelError> {
    if !gemv_args("gemv", m, n, a, x, y)? {
        return Ok(());
    }
    let x = &x[..n];
    for (row, yi) in a[..m * n].chunks_exact(n).zip(y[..m].iter_mut()) {
        let mut acc = 0.0;
        for (&aij, &xj) in row.iter().zip(x) {
            acc += aij * xj;
        }
        *yi = scale_acc(alpha, acc, beta, *yi);
    }
    Ok(())
}

/// Parallel [`gemv`]: rows of `A` are distributed across workers.
#[inline]
pub fn par_gemv(
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) -> Result<(), KernelError> {
    if !gemv_args("par_gemv", m, n, a, x, y)? {
        return Ok(());
    }
    let x = &x[..n];
    y[..m]
        .par_iter_mut()
        .zip(a[..m * n].par_chunks_exact(n))
        .for_each(|(yi, row)| {
            let acc: f64 = row.iter().zip(x).map(|(&aij, &xj)| aij * xj).sum();
            *yi = scale_acc(alpha, acc, beta, *yi);
        });
    Ok(())
}

/// `y ← α·A·x + β·y` with `A` supplied as its transpose `at` (`n × m` row-major).
///
/// `y` is first scaled by `β`, then accumulates `α·x[j]·A[:, j]` for each
/// column `j`, which is a contiguous row of `at`.
#[inline(always)]
pub fn gemv_transposed(
    m: usize,
    n: usize,
    alpha: f64,
    at: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) -> Result<(), KernelError> {
    if !gemv_args("gemv_transposed", m, n, at, x, y)? {
        return Ok(());
    }
    let y = &mut y[..m];
    if beta == 0.0 {
        y.fill(0.0);
    } else {
        for yi in y.iter_mut() {
            *yi *= beta;
        }
    }
    for (col, &xj) in at[..m * n].chunks_exact(m).zip(&x[..n]) {
        let s = alpha * xj;
        for (yi, &aij) in y.iter_mut().zip(col) {
            *yi += s * aij;
        }
    }
    Ok(())
}

/// Parallel [`gemv_transposed`]: each worker owns a contiguous block of `y`
/// and sweeps every column of `A` over that block.
#[inline]
pub fn par_gemv_transposed(
    m: usize,
    n: usize,
    alpha: f64,
    at: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) -> Result<(), KernelError> {
    if !gemv_args("par_gemv_transposed", m, n, at, x, y)? {
        return Ok(());
    }
    let x = &x[..n];
    let chunk = m.div_ceil(rayon::current_num_threads().max(1)).max(1);
    y[..m]
        .par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(c, block)| {
            let start = c * chunk;
            if beta == 0.0 {
                block.fill(0.0);
            } else {
                for yi in block.iter_mut() {
                    *yi *= beta;
                }
            }
            for (j, &xj) in x.iter().enumerate() {
                let s = alpha * xj;
                let col = &at[j * m + start..j * m + start + block.len()];
                for (yi, &aij) in block.iter_mut().zip(col) {
                    *yi += s * aij;
                }
            }
        });
    Ok(())
}

#[inline(always)]
fn ger_args(
    fname: &str,
    m: usize,
    n: usize,
    a: &[f64],
    x: &[f64],
    yt: &[f64],
) -> Result<bool, KernelError> {
    if has_empty(&[a.len(), x.len(), yt.len()]) {
        return Ok(false);
    }
    confirm_nonzero_dims(fname, &[m, n])?;
    confirm_min_len(fname, "a", a.len(), m.saturating_mul(n))?;
    confirm_min_len(fname, "x", x.len(), m)?;
    confirm_min_len(fname, "yt", yt.len(), n)?;
    Ok(true)
}

/// Rank-1 update `A ← A + α·x·ytᵀ`.
///
/// `A` is `m × n`, `x` holds `m` elements and `yt` holds `n`.
#[inline(always)]
pub fn ger(
    m: usize,
    n: usize,
    alpha: f64,
    a: &mut [f64],
    x: &[f64],
    yt: &[f64],
) -> Result<(), KernelError> {
    if !ger_args("ger", m, n, a, x, yt)? {
        return Ok(());
    }
    let yt = &yt[..n];
    for (row, &xi) in a[..m * n].chunks_exact_mut(n).zip(&x[..m]) {
        let s = alpha * xi;
        for (aij, &yj) in row.iter_mut().zip(yt) {
            *aij += s * yj;
        }
    }
    Ok(())
}

/// Parallel [`ger`], one row of `A` per task.
#[inline]
pub fn par_ger(
    m: usize,
    n: usize,
    alpha: f64,
    a: &mut [f64],
    x: &[f64],
    yt: &[f64],
) -> Result<(), KernelError> {
    if !ger_args("par_ger", m, n, a, x, yt)? {
        return Ok(());
    }
    let yt = &yt[..n];
    a[..m * n]
        .par_chunks_exact_mut(n)
        .zip(x[..m].par_iter())
        .for_each(|(row, &xi)| {
            let s = alpha * xi;
            for (aij, &yj) in row.iter_mut().zip(yt) {
                *aij += s * yj;
            }
        });
    Ok(())
}
