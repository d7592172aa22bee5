// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Krylov Drivers** - *Timed Gram-Schmidt Arnoldi Runs*
//!
//! Times repeated Arnoldi runs of both Gram-Schmidt variants on the same
//! input and checks that they agree. The residual norms `||Q||_F` and
//! `||H||_F` are captured after the first timed interval and attached to
//! the resulting [`Stats`].

use tracing::{debug, warn};

use crate::config::ERR_TOL;
use crate::errors::KernelError;
use crate::krylov::gram_schmidt::{
    ArnoldiStatus, Orthogonalization, classical_gram_schmidt, modified_gram_schmidt, residuals,
};
use crate::matrix::Matrix;
use crate::stats::{Residuals, SampleSet, Stats, Workload};
use crate::utils::relative_error;

use super::executor::Executor;
use super::timing;

/// Relative disagreement between the CGS and MGS residual norms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agreement {
    pub q_error: f64,
    pub h_error: f64,
    pub tolerance: f64,
}

impl Agreement {
    /// Compares MGS residuals against the CGS ones, with [`ERR_TOL`].
    pub fn between(cgs: &Residuals, mgs: &Residuals) -> Self {
        Self {
            q_error: relative_error(cgs.q, mgs.q),
            h_error: relative_error(cgs.h, mgs.h),
            tolerance: ERR_TOL,
        }
    }

    pub fn holds(&self) -> bool {
        self.q_error <= self.tolerance && self.h_error <= self.tolerance
    }
}

/// Both variants' statistics plus their agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct KrylovRun {
    pub cgs: Stats,
    pub mgs: Stats,
    pub agreement: Agreement,
}

fn driver_gram_schmidt(
    method: Orthogonalization,
    exec: &Executor,
    reps: usize,
    a: &Matrix,
    x: &[f64],
    deg_m: usize,
) -> Result<Stats, KernelError> {
    let n = a.rows();
    let title = method.title();
    let backend = exec.backend();
    let run = match method {
        Orthogonalization::Classical => classical_gram_schmidt,
        Orthogonalization::Modified => modified_gram_schmidt,
    };
    debug!(n, deg_m, %backend, title, "gram-schmidt driver");

    exec.install(|| {
        let mut q = Matrix::zeros(n, deg_m + 1)?;
        let mut h = Matrix::zeros(deg_m + 1, deg_m)?;
        let mut set = SampleSet::new(title, Workload::Krylov { size: n });

        let mut status = ArnoldiStatus::Complete;
        timing::record_one(&mut set, reps, &mut || -> Result<(), KernelError> {
            status = run(backend, a, x, &mut q, &mut h, deg_m)?;
            Ok(())
        })?;
        if let ArnoldiStatus::Breakdown { iteration } = status {
            warn!(title, iteration, "arnoldi stopped early");
        }
        set.set_residuals(residuals(&q, &h));

        timing::fill(&mut set, reps, &mut || -> Result<(), KernelError> {
            run(backend, a, x, &mut q, &mut h, deg_m).map(|_| ())
        })?;
        set.finish()
    })
}

/// Benchmarks classical Gram-Schmidt Arnoldi.
pub fn driver_cgs(
    exec: &Executor,
    reps: usize,
    a: &Matrix,
    x: &[f64],
    deg_m: usize,
) -> Result<Stats, KernelError> {
    driver_gram_schmidt(Orthogonalization::Classical, exec, reps, a, x, deg_m)
}

/// Benchmarks modified Gram-Schmidt Arnoldi.
pub fn driver_mgs(
    exec: &Executor,
    reps: usize,
    a: &Matrix,
    x: &[f64],
    deg_m: usize,
) -> Result<Stats, KernelError> {
    driver_gram_schmidt(Orthogonalization::Modified, exec, reps, a, x, deg_m)
}

/// Runs both drivers and compares their residuals.
///
/// Disagreement beyond tolerance is logged, not raised.
pub fn krylov_runs(
    exec: &Executor,
    reps: usize,
    a: &Matrix,
    x: &[f64],
    deg_m: usize,
) -> Result<KrylovRun, KernelError> {
    let cgs = driver_cgs(exec, reps, a, x, deg_m)?;
    let mgs = driver_mgs(exec, reps, a, x, deg_m)?;

    let missing = || KernelError::InvalidArguments("krylov driver produced no residuals".into());
    let agreement = Agreement::between(
        cgs.residuals.as_ref().ok_or_else(missing)?,
        mgs.residuals.as_ref().ok_or_else(missing)?,
    );
    if agreement.holds() {
        debug!(q_error = agreement.q_error, h_error = agreement.h_error, "CGS and MGS agree");
    } else {
        warn!(
            q_error = agreement.q_error,
            h_error = agreement.h_error,
            tolerance = agreement.tolerance,
            "CGS and MGS residuals disagree"
        );
    }
    Ok(KrylovRun { cgs, mgs, agreement })
}
