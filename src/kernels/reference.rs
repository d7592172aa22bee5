// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Vendor BLAS Reference** - *Cross-checks Against OpenBLAS*
//!
//! Thin wrappers over the Fortran BLAS interface with the same row-major
//! signatures as the native kernels. Used by the test suite to validate the
//! native kernels and by callers who want a vendor baseline.
//!
//! This module requires linking against BLAS (enabled by the
//! `linear_algebra` feature, which pulls in OpenBLAS).
//!
//! Row-major `m × n` storage is the column-major `n × m` transpose, so every
//! call swaps operands or transposition flags instead of copying.

use blas::{daxpy, ddot, dgemm, dgemv, dger, dnrm2};

use crate::errors::KernelError;
use crate::utils::{confirm_min_len, confirm_nonzero_dims, has_empty};

fn to_i32(fname: &str, v: usize) -> Result<i32, KernelError> {
    i32::try_from(v).map_err(|_| {
        KernelError::InvalidArguments(format!("{}: extent {} exceeds the BLAS index range", fname, v))
    })
}

/// `y ← a·x + y`.
pub fn axpy(n: usize, a: f64, x: &[f64], y: &mut [f64]) -> Result<(), KernelError> {
    confirm_min_len("reference::axpy", "x", x.len(), n)?;
    confirm_min_len("reference::axpy", "y", y.len(), n)?;
    let n = to_i32("reference::axpy", n)?;
    unsafe { daxpy(n, a, x, 1, y, 1) };
    Ok(())
}

/// `Σ xᵢ·yᵢ`.
pub fn dot(n: usize, x: &[f64], y: &[f64]) -> Result<f64, KernelError> {
    confirm_min_len("reference::dot", "x", x.len(), n)?;
    confirm_min_len("reference::dot", "y", y.len(), n)?;
    let n = to_i32("reference::dot", n)?;
    Ok(unsafe { ddot(n, x, 1, y, 1) })
}

/// `sqrt(Σ xᵢ²)`.
pub fn nrm2(n: usize, x: &[f64]) -> Result<f64, KernelError> {
    confirm_min_len("reference::nrm2", "x", x.len(), n)?;
    let n = to_i32("reference::nrm2", n)?;
    Ok(unsafe { dnrm2(n, x, 1) })
}

/// `y ← α·A·x + β·y`, `A` `m × n` row-major.
pub fn gemv(
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) -> Result<(), KernelError> {
    const F: &str = "reference::gemv";
    if has_empty(&[a.len(), x.len(), y.len()]) {
        return Ok(());
    }
    confirm_nonzero_dims(F, &[m, n])?;
    confirm_min_len(F, "a", a.len(), m.saturating_mul(n))?;
    confirm_min_len(F, "x", x.len(), n)?;
    confirm_min_len(F, "y", y.len(), m)?;
    let (mi, ni) = (to_i32(F, m)?, to_i32(F, n)?);
    // column-major view is Aᵀ (n × m, lda = n)
    unsafe { dgemv(b'T', ni, mi, alpha, a, ni, x, 1, beta, y, 1) };
    Ok(())
}

/// `A ← A + α·x·ytᵀ`, `A` `m × n` row-major.
pub fn ger(
    m: usize,
    n: usize,
    alpha: f64,
    a: &mut [f64],
    x: &[f64],
    yt: &[f64],
) -> Result<(), KernelError> {
    const F: &str = "reference::ger";
    if has_empty(&[a.len(), x.len(), yt.len()]) {
        return Ok(());
    }
    confirm_nonzero_dims(F, &[m, n])?;
    confirm_min_len(F, "a", a.len(), m.saturating_mul(n))?;
    confirm_min_len(F, "x", x.len(), m)?;
    confirm_min_len(F, "yt", yt.len(), n)?;
    let (mi, ni) = (to_i32(F, m)?, to_i32(F, n)?);
    // Aᵀ += α·yt·xᵀ in column-major
    unsafe { dger(ni, mi, alpha, yt, 1, x, 1, a, ni) };
    Ok(())
}

/// `C ← α·A·B + β·C` with `A` `l × n`, `B` `n × m`, `C` `l × m`, row-major.
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
    const F: &str = "reference::gemm";
    if has_empty(&[a.len(), b.len(), c.len()]) {
        return Ok(());
    }
    confirm_nonzero_dims(F, &[l, m, n])?;
    confirm_min_len(F, "a", a.len(), l.saturating_mul(n))?;
    confirm_min_len(F, "b", b.len(), n.saturating_mul(m))?;
    confirm_min_len(F, "c", c.len(), l.saturating_mul(m))?;
    let (li, mi, ni) = (to_i32(F, l)?, to_i32(F, m)?, to_i32(F, n)?);
    // Cᵀ = Bᵀ·Aᵀ in column-major
    unsafe { dgemm(b'N', b'N', mi, li, ni, alpha, b, mi, a, ni, beta, c, mi) };
    Ok(())
}
