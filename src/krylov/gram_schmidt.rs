// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Gram-Schmidt Arnoldi** - *Orthonormal Krylov Bases*
//!
//! Builds an orthonormal basis `Q` of the Krylov subspace
//! `K(A, x) = span{x, A·x, A²·x, …}` together with the upper Hessenberg
//! matrix `H` of orthogonalisation coefficients.
//!
//! ## Shapes
//! - `A`: `n × n`
//! - `x`: `n` elements, must not be (numerically) zero
//! - `Q`: `n × (deg_m + 1)`
//! - `H`: `(deg_m + 1) × deg_m`
//!
//! ## Variants
//! - **Classical** (CGS): every coefficient `H[j, k-1]` is projected against
//!   the same unmodified `v = A·q_{k-1}`, then all projections are removed.
//! - **Modified** (MGS): each projection is removed from `v` before the next
//!   coefficient is computed. Numerically more robust.
//!
//! Iteration `k` runs for `1 <= k < deg_m`. If the residual norm
//! `H[k, k-1]` falls to [`BREAKDOWN_EPSILON`] or below, the Krylov sequence
//! has become linearly dependent: the process stops and returns
//! [`ArnoldiStatus::Breakdown`], leaving the remaining columns of `Q` and `H`
//! untouched.

use tracing::{debug, warn};

use crate::config::BREAKDOWN_EPSILON;
use crate::errors::KernelError;
use crate::kernels::backend::Backend;
use crate::matrix::{Matrix, Vector};
use crate::stats::Residuals;

/// Gram-Schmidt flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orthogonalization {
    Classical,
    Modified,
}

impl Orthogonalization {
    /// Report title of the variant.
    pub fn title(self) -> &'static str {
        match self {
            Orthogonalization::Classical => "cgs",
            Orthogonalization::Modified => "mgs",
        }
    }
}

/// How an Arnoldi run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArnoldiStatus {
    /// Every iteration produced a new basis vector.
    Complete,
    /// The residual vanished at `iteration`; `Q[:, iteration..]` is unset.
    Breakdown { iteration: usize },
}

impl ArnoldiStatus {
    pub fn is_breakdown(&self) -> bool {
        matches!(self, ArnoldiStatus::Breakdown { .. })
    }
}

/// Output of [`arnoldi`].
#[derive(Debug)]
pub struct KrylovBasis {
    pub q: Matrix,
    pub h: Matrix,
    pub status: ArnoldiStatus,
}

impl KrylovBasis {
    /// Frobenius norms of `Q` and `H`.
    pub fn residuals(&self) -> Residuals {
        residuals(&self.q, &self.h)
    }
}

/// Frobenius norms of a `Q`/`H` pair.
pub fn residuals(q: &Matrix, h: &Matrix) -> Residuals {
    Residuals {
        q: crate::kernels::blas1::nrmf(q.rows(), q.cols(), q.as_slice()),
        h: crate::kernels::blas1::nrmf(h.rows(), h.cols(), h.as_slice()),
    }
}

/// Column scratch space, allocated once per call.
struct Workspace {
    prev: Vector,
    v: Vector,
    qj: Vector,
}

impl Workspace {
    fn new(n: usize) -> Result<Self, KernelError> {
        Ok(Self {
            prev: Matrix::vector_zeros(n)?,
            v: Matrix::vector_zeros(n)?,
            qj: Matrix::vector_zeros(n)?,
        })
    }
}

/// Validates shapes and returns `n`.
fn check_shapes(
    a: &Matrix,
    x: &[f64],
    q: &Matrix,
    h: &Matrix,
    deg_m: usize,
) -> Result<usize, KernelError> {
    let n = a.rows();
    if n == 0 || a.cols() != n {
        return Err(KernelError::InvalidArguments(format!(
            "gram_schmidt: A must be square and non-empty, got {} x {}",
            a.rows(),
            a.cols()
        )));
    }
    if deg_m == 0 {
        return Err(KernelError::InvalidArguments(
            "gram_schmidt: degree must be at least 1".into(),
        ));
    }
    if x.len() < n {
        return Err(KernelError::LengthMismatch(crate::errors::log_length_mismatch(
            "gram_schmidt",
            "x",
            n,
            x.len(),
        )));
    }
    if q.rows() != n || q.cols() != deg_m + 1 {
        return Err(KernelError::InvalidArguments(format!(
            "gram_schmidt: Q must be {} x {}, got {} x {}",
            n,
            deg_m + 1,
            q.rows(),
            q.cols()
        )));
    }
    if h.rows() != deg_m + 1 || h.cols() != deg_m {
        return Err(KernelError::InvalidArguments(format!(
            "gram_schmidt: H must be {} x {}, got {} x {}",
            deg_m + 1,
            deg_m,
            h.rows(),
            h.cols()
        )));
    }
    Ok(n)
}

/// Normalises the seed into `Q[:, 0]`.
fn seed_first_column(backend: Backend, x: &[f64], q: &mut Matrix, n: usize) -> Result<(), KernelError> {
    let norm = backend.nrm2(n, x);
    if !(norm > BREAKDOWN_EPSILON) {
        return Err(KernelError::InvalidArguments(format!(
            "gram_schmidt: seed vector norm {:e} is numerically zero",
            norm
        )));
    }
    q.set_column_scaled(0, x, 1.0 / norm);
    Ok(())
}

/// Stores `H[k, k-1] = ||v||` and, unless the sequence broke down,
/// `Q[:, k] = v / ||v||`.
fn close_iteration(
    backend: Backend,
    k: usize,
    n: usize,
    v: &[f64],
    q: &mut Matrix,
    h: &mut Matrix,
) -> Option<ArnoldiStatus> {
    let hk = backend.nrm2(n, v);
    h.set(k, k - 1, hk);
    if hk <= BREAKDOWN_EPSILON {
        debug!(iteration = k, residual = hk, "krylov sequence broke down");
        return Some(ArnoldiStatus::Breakdown { iteration: k });
    }
    q.set_column_scaled(k, v, 1.0 / hk);
    None
}

/// Classical Gram-Schmidt Arnoldi.
///
/// `q` and `h` are expected zero-initialised; only the entries produced
/// by completed iterations are written.
pub fn classical_gram_schmidt(
    backend: Backend,
    a: &Matrix,
    x: &[f64],
    q: &mut Matrix,
    h: &mut Matrix,
    deg_m: usize,
) -> Result<ArnoldiStatus, KernelError> {
    let n = check_shapes(a, x, q, h, deg_m)?;
    let mut ws = Workspace::new(n)?;
    seed_first_column(backend, x, q, n)?;

    for k in 1..deg_m {
        q.column_into(k - 1, ws.prev.as_mut_slice());
        backend.gemv(n, n, 1.0, a.as_slice(), ws.prev.as_slice(), 0.0, ws.v.as_mut_slice())?;

        for j in 0..k {
            q.column_into(j, ws.qj.as_mut_slice());
            h.set(j, k - 1, backend.dot(n, ws.qj.as_slice(), ws.v.as_slice()));
        }
        for j in 0..k {
            q.column_into(j, ws.qj.as_mut_slice());
            backend.axpy(n, -h.get(j, k - 1), ws.qj.as_slice(), ws.v.as_mut_slice());
        }

        if let Some(status) = close_iteration(backend, k, n, ws.v.as_slice(), q, h) {
            return Ok(status);
        }
    }
    Ok(ArnoldiStatus::Complete)
}

/// Modified Gram-Schmidt Arnoldi.
///
/// Same contract as [`classical_gram_schmidt`].
pub fn modified_gram_schmidt(
    backend: Backend,
    a: &Matrix,
    x: &[f64],
    q: &mut Matrix,
    h: &mut Matrix,
    deg_m: usize,
) -> Result<ArnoldiStatus, KernelError> {
    let n = check_shapes(a, x, q, h, deg_m)?;
    let mut ws = Workspace::new(n)?;
    seed_first_column(backend, x, q, n)?;

    for k in 1..deg_m {
        q.column_into(k - 1, ws.prev.as_mut_slice());
        backend.gemv(n, n, 1.0, a.as_slice(), ws.prev.as_slice(), 0.0, ws.v.as_mut_slice())?;

        for j in 0..k {
            q.column_into(j, ws.qj.as_mut_slice());
            let hjk = backend.dot(n, ws.qj.as_slice(), ws.v.as_slice());
            h.set(j, k - 1, hjk);
            backend.axpy(n, -hjk, ws.qj.as_slice(), ws.v.as_mut_slice());
        }

        if let Some(status) = close_iteration(backend, k, n, ws.v.as_slice(), q, h) {
            return Ok(status);
        }
    }
    Ok(ArnoldiStatus::Complete)
}

/// Runs one variant on freshly allocated, zeroed `Q` and `H`.
pub fn arnoldi(
    method: Orthogonalization,
    backend: Backend,
    a: &Matrix,
    x: &[f64],
    deg_m: usize,
) -> Result<KrylovBasis, KernelError> {
    let n = a.rows();
    let mut q = Matrix::zeros(n, deg_m + 1)?;
    let mut h = Matrix::zeros(deg_m + 1, deg_m)?;
    let status = match method {
        Orthogonalization::Classical => classical_gram_schmidt(backend, a, x, &mut q, &mut h, deg_m)?,
        Orthogonalization::Modified => modified_gram_schmidt(backend, a, x, &mut q, &mut h, deg_m)?,
    };
    if let ArnoldiStatus::Breakdown { iteration } = status {
        warn!(method = method.title(), iteration, "arnoldi stopped early");
    }
    Ok(KrylovBasis { q, h, status })
}
