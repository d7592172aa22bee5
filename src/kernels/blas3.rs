// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **BLAS Level 3 Kernels** - *Matrix-Matrix Multiplication*
//!
//! `C ← α·A·B + β·C` with `A` `l × n`, `B` `n × m` and `C` `l × m`, all
//! row-major. [`gemm`] walks `B` down its columns; [`gemm_transposed_b`]
//! takes `Bᵀ` so that every inner product runs over two contiguous rows.
//!
//! When `α == 0` the product is skipped entirely: `C` is zero-filled if
//! `β == 0`, otherwise scaled by `β`.
//!
//! Preconditions follow the BLAS2 kernels: empty buffer, then zero extent,
//! then short buffer.

use rayon::prelude::*;

use crate::errors::KernelError;
use crate::utils::{confirm_min_len, confirm_nonzero_dims, has_empty};

#[inline(always)]
fn gemm_args(
    fname: &str,
    (l, m, n): (usize, usize, usize),
    a: &[f64],
    b: &[f64],
    c: &[f64],
) -> Result<bool, KernelError> {
    if has_empty(&[a.len(), b.len(), c.len()]) {
        return Ok(false);
    }
    confirm_nonzero_dims(fname, &[l, m, n])?;
    confirm_min_len(fname, "a", a.len(), l.saturating_mul(n))?;
    confirm_min_len(fname, "b", b.len(), n.saturating_mul(m))?;
    confirm_min_len(fname, "c", c.len(), l.saturating_mul(m))?;
    Ok(true)
}

/// Applies `C ← β·C`; zero-fills when `β == 0`.
#[inline(always)]
fn scale_c(beta: f64, c: &mut [f64]) {
    if beta == 0.0 {
        c.fill(0.0);
    } else {
        for v in c.iter_mut() {
            *v *= beta;
        }
    }
}

#[inline(always)]
fn gemm_row(
    m: usize,
    alpha: f64,
    a_row: &[f64],
    b: &[f64],
    beta: f64,
    c_row: &mut [f64],
) {
    for (j, cij) in c_row.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (k, &aik) in a_row.iter().enumerate() {
            acc += aik * b[k * m + j];
        }
        *cij = if beta == 0.0 {
            alpha * acc
        } else {
            alpha * acc + beta * *cij
        };
    }
}

#[inline(always)]
fn gemm_row_bt(alpha: f64, a_row: &[f64], bt: &[f64], beta: f64, c_row: &mut [f64]) {
    let n = a_row.len();
    for (cij, bt_row) in c_row.iter_mut().zip(bt.chunks_exact(n)) {
        let mut acc = 0.0;
        for (&aik, &bjk) in a_row.iter().zip(bt_row) {
            acc += aik * bjk;
        }
        *cij = if beta == 0.0 {
            alpha * acc
        } else {
            alpha * acc + beta * *cij
        };
    }
}

/// General matrix-matrix product `C ← α·A·B + β·C`.
#[inline(always)]
pub fn gemm(
    l: usize,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    b: &[f64],
    beta: f64,
    c: &mut [f64],
) -> Result<(), KernelError> {
    if !gemm_args("gemm", (l, m, n), a, b, c)? {
        return Ok(());
    }
    let c = &mut c[..l * m];
    if alpha == 0.0 {
        scale_c(beta, c);
        return Ok(());
    }
    let b = &b[..n * m];
    for (a_row, c_row) in a[..l * n].chunks_exact(n).zip(c.chunks_exact_mut(m)) {
        gemm_row(m, alpha, a_row, b, beta, c_row);
    }
    Ok(())
}

/// Parallel [`gemm`], one row of `C` per task.
#[inline]
pub fn par_gemm(
    l: usize,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    b: &[f64],
    beta: f64,
    c: &mut [f64],
) -> Result<(), KernelError> {
    if !gemm_args("par_gemm", (l, m, n), a, b, c)? {
        return Ok(());
    }
    let c = &mut c[..l * m];
    if alpha == 0.0 {
        c.par_chunks_mut(m).for_each(|row| scale_c(beta, row));
        return Ok(());
    }
    let b = &b[..n * m];
    c.par_chunks_exact_mut(m)
        .zip(a[..l * n].par_chunks_exact(n))
        .for_each(|(c_row, a_row)| gemm_row(m, alpha, a_row, b, beta, c_row));
    Ok(())
}

/// `C ← α·A·B + β·C` with `B` supplied as `bt = Bᵀ` (`m × n` row-major).
#[inline(always)]
pub fn gemm_transposed_b(
    l: usize,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    bt: &[f64],
    beta: f64,
    c: &mut [f64],
) -> Result<(), KernelError> {
    if !gemm_args("gemm_transposed_b", (l, m, n), a, bt, c)? {
        return Ok(());
    }
    let c = &mut c[..l * m];
    if alpha == 0.0 {
        scale_c(beta, c);
        return Ok(());
    }
    let bt = &bt[..m * n];
    for (a_row, c_row) in a[..l * n].chunks_exact(n).zip(c.chunks_exact_mut(m)) {
        gemm_row_bt(alpha, a_row, bt, beta, c_row);
    }
    Ok(())
}

/// Parallel [`gemm_transposed_b`].
#[inline]
pub fn par_gemm_transposed_b(
    l: usize,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    bt: &[f64],
    beta: f64,
    c: &mut [f64],
) -> Result<(), KernelError> {
    if !gemm_args("par_gemm_transposed_b", (l, m, n), a, bt, c)? {
        return Ok(());
    }
    let c = &mut c[..l * m];
    if alpha == 0.0 {
        c.par_chunks_mut(m).for_each(|row| scale_c(beta, row));
        return Ok(());
    }
    let bt = &bt[..m * n];
    c.par_chunks_exact_mut(m)
        .zip(a[..l * n].par_chunks_exact(n))
        .for_each(|(c_row, a_row)| gemm_row_bt(alpha, a_row, bt, beta, c_row));
    Ok(())
}
