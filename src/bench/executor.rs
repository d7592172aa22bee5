// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Executor** - *Explicit Worker Pool for Parallel Kernels*
//!
//! Owns the rayon pool a benchmark run uses. The thread count is fixed when
//! the executor is built; `0` or `1` selects the sequential kernels and no
//! pool is created at all. Every measurement is installed inside the pool, so the
//! `par_*` kernels never touch rayon's global pool.

use tracing::debug;

use crate::errors::KernelError;
use crate::kernels::backend::Backend;
use crate::stats::{Stats, Workload};

use super::timing;

pub struct Executor {
    pool: Option<rayon::ThreadPool>,
}

impl Executor {
    /// Builds an executor with `threads` workers; `0` and `1` mean sequential.
    pub fn new(threads: usize) -> Result<Self, KernelError> {
        if threads <= 1 {
            return Ok(Self::sequential());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("mini-blas-{idx}"))
            .build()?;
        debug!(threads, "worker pool ready");
        Ok(Self { pool: Some(pool) })
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    /// Kernel family matching the pool configuration.
    pub fn backend(&self) -> Backend {
        if self.pool.is_some() {
            Backend::Parallel
        } else {
            Backend::Sequential
        }
    }

    /// Worker count as reported in benchmark results; sequential runs count as 1.
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Runs `op` inside the pool, or directly when sequential.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Times `op` inside the pool; see [`timing::measure`].
    pub fn measure<F>(
        &self,
        title: &str,
        workload: Workload,
        reps: usize,
        op: F,
    ) -> Result<Stats, KernelError>
    where
        F: FnMut() -> Result<(), KernelError> + Send,
    {
        self.install(|| timing::measure(title, workload, reps, op))
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("backend", &self.backend())
            .field("threads", &self.threads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_is_sequential() {
        let exec = Executor::new(0).unwrap();
        assert_eq!(exec.backend(), Backend::Sequential);
        assert_eq!(exec.threads(), 1);
        assert_eq!(exec.install(|| 7), 7);
    }

    #[test]
    fn single_thread_is_sequential() {
        let exec = Executor::new(1).unwrap();
        assert_eq!(exec.backend(), Backend::Sequential);
        assert_eq!(exec.threads(), 1);
        assert!(exec.pool.is_none());
    }

    #[test]
    fn pool_reports_its_size() {
        let exec = Executor::new(3).unwrap();
        assert_eq!(exec.backend(), Backend::Parallel);
        assert_eq!(exec.threads(), 3);
        assert_eq!(exec.install(rayon::current_num_threads), 3);
    }
}
