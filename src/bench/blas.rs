// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **BLAS Drivers** - *Timed Kernel Benchmarks and Suite Runners*
//!
//! One driver per benchmarked kernel. A driver validates its operands, runs
//! the kernel `reps` times per sample through the [`Executor`] and returns
//! the resulting [`Stats`]. Element and flop counts per call:
//!
//! | driver      | level | elements       | flops          |
//! |-------------|-------|----------------|----------------|
//! | `daxpy`     | 1     | 2n             | 2n             |
//! | `ddot`      | 1     | 2n             | 2n             |
//! | `dnrm2`     | 1     | n              | 2n             |
//! | `dmax`      | 1     | n              | n              |
//! | `dgemv`     | 2     | mn + n + m     | 2mn + 3m       |
//! | `dgemv_var` | 2     | mn + n + m     | 2mn + 3m       |
//! | `dger`      | 2     | mn + m + n     | 3mn            |
//! | `dgemm`     | 3     | ln + nm + lm   | 2lmn + 3lm     |
//! | `dgemm_var` | 3     | ln + nm + lm   | 2lmn + 3lm     |
//!
//! The `_var` drivers benchmark the same product with a transposed operand
//! (`Aᵀ` for GEMV, `Bᵀ` for GEMM) to compare memory access patterns.
//!
//! The suite runners allocate operands from the run configuration and return
//! one outcome per driver, so a failing benchmark never stops the others.

use std::hint::black_box;

use rand::Rng;
use tracing::debug;

use crate::config::{BenchConfig, BlasLevel};
use crate::errors::KernelError;
use crate::matrix::{Matrix, Vector};
use crate::stats::{Stats, Workload};
use crate::utils::confirm_min_len;

use super::executor::Executor;

/// Title of a driver paired with its result.
pub type Outcome = (&'static str, Result<Stats, KernelError>);

pub const BLAS1_TITLES: [&str; 4] = ["daxpy", "ddot", "dnrm2", "dmax"];
pub const BLAS2_TITLES: [&str; 3] = ["dgemv", "dgemv_var", "dger"];
pub const BLAS3_TITLES: [&str; 2] = ["dgemm", "dgemm_var"];

fn kernel_workload(exec: &Executor, level: BlasLevel, elements: usize, flops: u64) -> Workload {
    Workload::Kernel {
        level,
        threads: exec.threads(),
        elements,
        flops,
    }
}

/// Benchmarks `y ← α·x + y`.
pub fn driver_daxpy(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    x: &Vector,
    y: &mut Vector,
) -> Result<Stats, KernelError> {
    let n = x.len();
    confirm_min_len("daxpy", "y", y.len(), n)?;
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::One, 2 * n, 2 * n as u64);
    debug!(n, %backend, "daxpy");
    let (x, y) = (x.as_slice(), y.as_mut_slice());
    exec.measure("daxpy", workload, reps, || {
        backend.axpy(n, alpha, x, y);
        Ok(())
    })
}

/// Benchmarks `x · y`.
pub fn driver_ddot(exec: &Executor, reps: usize, x: &Vector, y: &Vector) -> Result<Stats, KernelError> {
    let n = x.len();
    confirm_min_len("ddot", "y", y.len(), n)?;
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::One, 2 * n, 2 * n as u64);
    debug!(n, %backend, "ddot");
    let (x, y) = (x.as_slice(), y.as_slice());
    exec.measure("ddot", workload, reps, || {
        black_box(backend.dot(n, x, y));
        Ok(())
    })
}

/// Benchmarks `||x||₂`.
pub fn driver_dnrm2(exec: &Executor, reps: usize, x: &Vector) -> Result<Stats, KernelError> {
    let n = x.len();
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::One, n, 2 * n as u64);
    debug!(n, %backend, "dnrm2");
    let x = x.as_slice();
    exec.measure("dnrm2", workload, reps, || {
        black_box(backend.nrm2(n, x));
        Ok(())
    })
}

/// Benchmarks `max(x)`.
pub fn driver_dmax(exec: &Executor, reps: usize, x: &Vector) -> Result<Stats, KernelError> {
    let n = x.len();
    if n == 0 {
        return Err(KernelError::InvalidArguments("dmax: empty vector".into()));
    }
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::One, n, n as u64);
    debug!(n, %backend, "dmax");
    let x = x.as_slice();
    exec.measure("dmax", workload, reps, || {
        black_box(backend.max(n, x));
        Ok(())
    })
}

fn gemv_counts(m: usize, n: usize) -> (usize, u64) {
    let (mu, nu) = (m as u64, n as u64);
    (m * n + n + m, 2 * mu * nu + 3 * mu)
}

/// Benchmarks `y ← α·A·x + β·y`.
pub fn driver_dgemv(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    a: &Matrix,
    x: &Vector,
    beta: f64,
    y: &mut Vector,
) -> Result<Stats, KernelError> {
    let (m, n) = (a.rows(), a.cols());
    let (elements, flops) = gemv_counts(m, n);
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::Two, elements, flops);
    debug!(m, n, %backend, "dgemv");
    let (a, x, y) = (a.as_slice(), x.as_slice(), y.as_mut_slice());
    exec.measure("dgemv", workload, reps, || backend.gemv(m, n, alpha, a, x, beta, y))
}

/// Benchmarks `y ← α·A·x + β·y` reading `A` through its transpose.
///
/// The transposed copy is built before timing and dropped afterwards.
pub fn driver_dgemv_var(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    a: &Matrix,
    x: &Vector,
    beta: f64,
    y: &mut Vector,
) -> Result<Stats, KernelError> {
    let (m, n) = (a.rows(), a.cols());
    let at = a.transposed()?;
    let (elements, flops) = gemv_counts(m, n);
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::Two, elements, flops);
    debug!(m, n, %backend, "dgemv_var");
    let (at, x, y) = (at.as_slice(), x.as_slice(), y.as_mut_slice());
    exec.measure("dgemv_var", workload, reps, || {
        backend.gemv_transposed(m, n, alpha, at, x, beta, y)
    })
}

/// Benchmarks `A ← A + α·x·yᵀ`.
///
/// `y` is transposed in place for the duration of the benchmark and
/// restored afterwards.
pub fn driver_dger(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    a: &mut Matrix,
    x: &Vector,
    y: &mut Vector,
) -> Result<Stats, KernelError> {
    y.transpose_in_place()?;
    let (m, n) = (a.rows(), a.cols());
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::Two, m * n + m + n, 3 * m as u64 * n as u64);
    debug!(m, n, %backend, "dger");
    let result = {
        let (a, x, yt) = (a.as_mut_slice(), x.as_slice(), y.as_slice());
        exec.measure("dger", workload, reps, || backend.ger(m, n, alpha, a, x, yt))
    };
    y.transpose_in_place()?;
    result
}

fn confirm_inner(fname: &str, a: &Matrix, b: &Matrix) -> Result<(), KernelError> {
    if a.cols() != b.rows() {
        return Err(KernelError::InvalidArguments(format!(
            "{}: A is {} x {} but B is {} x {}",
            fname,
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

fn gemm_counts(l: usize, m: usize, n: usize) -> (usize, u64) {
    let (lu, mu, nu) = (l as u64, m as u64, n as u64);
    (l * n + n * m + l * m, 2 * lu * mu * nu + 3 * lu * mu)
}

/// Benchmarks `C ← α·A·B + β·C`.
pub fn driver_dgemm(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    a: &Matrix,
    b: &Matrix,
    beta: f64,
    c: &mut Matrix,
) -> Result<Stats, KernelError> {
    confirm_inner("dgemm", a, b)?;
    let (l, n, m) = (a.rows(), a.cols(), b.cols());
    let (elements, flops) = gemm_counts(l, m, n);
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::Three, elements, flops);
    debug!(l, m, n, %backend, "dgemm");
    let (a, b, c) = (a.as_slice(), b.as_slice(), c.as_mut_slice());
    exec.measure("dgemm", workload, reps, || backend.gemm(l, m, n, alpha, a, b, beta, c))
}

/// Benchmarks `C ← α·A·B + β·C` reading `B` through its transpose.
pub fn driver_dgemm_var(
    exec: &Executor,
    reps: usize,
    alpha: f64,
    a: &Matrix,
    b: &Matrix,
    beta: f64,
    c: &mut Matrix,
) -> Result<Stats, KernelError> {
    confirm_inner("dgemm_var", a, b)?;
    let (l, n, m) = (a.rows(), a.cols(), b.cols());
    let bt = b.transposed()?;
    let (elements, flops) = gemm_counts(l, m, n);
    let backend = exec.backend();
    let workload = kernel_workload(exec, BlasLevel::Three, elements, flops);
    debug!(l, m, n, %backend, "dgemm_var");
    let (a, bt, c) = (a.as_slice(), bt.as_slice(), c.as_mut_slice());
    exec.measure("dgemm_var", workload, reps, || {
        backend.gemm_transposed_b(l, m, n, alpha, a, bt, beta, c)
    })
}

/// Every driver in `titles` fails with `err`.
fn skipped(titles: &[&'static str], err: KernelError) -> Vec<Outcome> {
    titles.iter().map(|&t| (t, Err(err.clone()))).collect()
}

/// Runs the BLAS1 drivers on two random vectors of `cfg.vector_len()` elements.
pub fn blas1_runs<R: Rng>(cfg: &BenchConfig, exec: &Executor, rng: &mut R) -> Vec<Outcome> {
    let len = cfg.vector_len();
    let alpha: f64 = rng.random_range(-1.0..1.0);
    let operands = (|| {
        Ok::<_, KernelError>((Matrix::vector_random(len, rng)?, Matrix::vector_random(len, rng)?))
    })();
    let (x, mut y) = match operands {
        Ok(v) => v,
        Err(e) => return skipped(&BLAS1_TITLES, e),
    };
    debug!(len, alpha, ?x, ?y, "BLAS1 operands");

    vec![
        ("daxpy", driver_daxpy(exec, cfg.reps, alpha, &x, &mut y)),
        ("ddot", driver_ddot(exec, cfg.reps, &x, &y)),
        ("dnrm2", driver_dnrm2(exec, cfg.reps, &x)),
        ("dmax", driver_dmax(exec, cfg.reps, &x)),
    ]
}

/// Runs the BLAS2 drivers on a random `rows × cols` matrix.
///
/// GEMV reads `x` (`cols` elements) and updates `y` (`rows` elements); GER
/// uses them the other way around.
pub fn blas2_runs<R: Rng>(cfg: &BenchConfig, exec: &Executor, rng: &mut R) -> Vec<Outcome> {
    let (rows, cols) = cfg.matrix_dims();
    let alpha: f64 = rng.random_range(-1.0..1.0);
    let beta: f64 = rng.random_range(-1.0..1.0);
    let operands = (|| {
        Ok::<_, KernelError>((
            Matrix::random(rows, cols, rng)?,
            Matrix::vector_random(cols, rng)?,
            Matrix::vector_random(rows, rng)?,
        ))
    })();
    let (mut a, mut x, mut y) = match operands {
        Ok(v) => v,
        Err(e) => return skipped(&BLAS2_TITLES, e),
    };
    debug!(rows, cols, alpha, beta, ?a, ?x, ?y, "BLAS2 operands");

    vec![
        ("dgemv", driver_dgemv(exec, cfg.reps, alpha, &a, &x, beta, &mut y)),
        ("dgemv_var", driver_dgemv_var(exec, cfg.reps, alpha, &a, &x, beta, &mut y)),
        ("dger", driver_dger(exec, cfg.reps, alpha, &mut a, &y, &mut x)),
    ]
}

/// Runs the BLAS3 drivers: `A` is `rows × cols`, `B` is `cols × cols` and
/// `C` (initialised to ones) is `rows × cols`.
pub fn blas3_runs<R: Rng>(cfg: &BenchConfig, exec: &Executor, rng: &mut R) -> Vec<Outcome> {
    let (rows, cols) = cfg.matrix_dims();
    let alpha: f64 = rng.random_range(-1.0..1.0);
    let beta: f64 = rng.random_range(-1.0..1.0);
    let operands = (|| {
        Ok::<_, KernelError>((
            Matrix::random(rows, cols, rng)?,
            Matrix::random(cols, cols, rng)?,
            Matrix::ones(rows, cols)?,
        ))
    })();
    let (a, b, mut c) = match operands {
        Ok(v) => v,
        Err(e) => return skipped(&BLAS3_TITLES, e),
    };
    debug!(rows, cols, alpha, beta, ?a, ?b, ?c, "BLAS3 operands");

    vec![
        ("dgemm", driver_dgemm(exec, cfg.reps, alpha, &a, &b, beta, &mut c)),
        ("dgemm_var", driver_dgemm_var(exec, cfg.reps, alpha, &a, &b, beta, &mut c)),
    ]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn cfg(len: usize) -> BenchConfig {
        BenchConfig {
            reps: 2,
            shape: Some(crate::config::ProblemShape::Square { len }),
            ..BenchConfig::default()
        }
    }

    fn kernel_counts(stats: &Stats) -> (BlasLevel, usize, u64) {
        match stats.workload {
            Workload::Kernel { level, elements, flops, .. } => (level, elements, flops),
            Workload::Krylov { .. } => panic!("kernel workload expected"),
        }
    }

    #[test]
    fn blas1_counts() {
        let exec = Executor::sequential();
        let out = blas1_runs(&cfg(16), &exec, &mut StdRng::seed_from_u64(0));
        let titles: Vec<_> = out.iter().map(|(t, _)| *t).collect();
        assert_eq!(titles, BLAS1_TITLES);
        let counts: Vec<_> = out.iter().map(|(_, r)| kernel_counts(r.as_ref().unwrap())).collect();
        assert_eq!(counts[0], (BlasLevel::One, 32, 32));
        assert_eq!(counts[1], (BlasLevel::One, 32, 32));
        assert_eq!(counts[2], (BlasLevel::One, 16, 32));
        assert_eq!(counts[3], (BlasLevel::One, 16, 16));
    }

    #[test]
    fn blas2_and_blas3_counts() {
        let exec = Executor::sequential();
        let out = blas2_runs(&cfg(4), &exec, &mut StdRng::seed_from_u64(0));
        let counts: Vec<_> = out.iter().map(|(_, r)| kernel_counts(r.as_ref().unwrap())).collect();
        assert_eq!(counts[0], (BlasLevel::Two, 24, 44));
        assert_eq!(counts[1], (BlasLevel::Two, 24, 44));
        assert_eq!(counts[2], (BlasLevel::Two, 24, 48));

        let out = blas3_runs(&cfg(4), &exec, &mut StdRng::seed_from_u64(0));
        let counts: Vec<_> = out.iter().map(|(_, r)| kernel_counts(r.as_ref().unwrap())).collect();
        assert_eq!(counts[0], (BlasLevel::Three, 48, 176));
        assert_eq!(counts[1], (BlasLevel::Three, 48, 176));
    }

    #[test]
    fn dger_restores_the_vector_orientation() {
        let exec = Executor::sequential();
        let mut a = Matrix::zeros(3, 2).unwrap();
        let x = Matrix::vector_ones(3).unwrap();
        let mut y = Matrix::vector_ones(2).unwrap();
        driver_dger(&exec, 1, 1.0, &mut a, &x, &mut y).unwrap();
        assert_eq!((y.rows(), y.cols()), (2, 1));
        assert!(a.as_slice().iter().all(|&v| v >= 1.0));
    }

    #[test]
    fn dgemv_var_leaves_operands_consistent() {
        let exec = Executor::sequential();
        let mut rng = StdRng::seed_from_u64(3);
        let a = Matrix::random(5, 3, &mut rng).unwrap();
        let x = Matrix::vector_random(3, &mut rng).unwrap();
        let mut y1 = Matrix::vector_zeros(5).unwrap();
        let mut y2 = Matrix::vector_zeros(5).unwrap();
        driver_dgemv(&exec, 1, 1.0, &a, &x, 0.0, &mut y1).unwrap();
        driver_dgemv_var(&exec, 1, 1.0, &a, &x, 0.0, &mut y2).unwrap();
        for (p, q) in y1.as_slice().iter().zip(y2.as_slice()) {
            assert!((p - q).abs() < 1e-12);
        }
    }

    #[test]
    fn short_operands_are_reported_not_panicked() {
        let exec = Executor::sequential();
        let x = Matrix::vector_ones(4).unwrap();
        let mut y = Matrix::vector_ones(3).unwrap();
        let err = driver_daxpy(&exec, 1, 1.0, &x, &mut y).unwrap_err();
        assert!(matches!(err, KernelError::LengthMismatch(_)));

        let a = Matrix::ones(4, 4).unwrap();
        let err = driver_dgemv(&exec, 1, 1.0, &a, &x, 0.0, &mut y).unwrap_err();
        assert!(matches!(err, KernelError::LengthMismatch(_)));
    }

    #[test]
    fn parallel_suite_reports_thread_count() {
        let exec = Executor::new(2).unwrap();
        let out = blas1_runs(&cfg(64), &exec, &mut StdRng::seed_from_u64(9));
        for (_, r) in out {
            match r.unwrap().workload {
                Workload::Kernel { threads, .. } => assert_eq!(threads, 2),
                Workload::Krylov { .. } => unreachable!(),
            }
        }
    }
}
