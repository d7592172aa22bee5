// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Timing** - *Repetition Loops and Sample Collection*
//!
//! One sample is the average latency of `reps` back-to-back calls, measured
//! with a monotonic clock over a single interval. Intervals whose average is
//! not positive are measured again.

use std::time::Instant;

use tracing::trace;

use crate::config::MAX_SAMPLES;
use crate::errors::KernelError;
use crate::stats::{Recorded, SampleSet, Stats, Workload};

/// Average latency in nanoseconds of `reps` calls of `op`.
#[inline]
pub fn time_interval<F>(reps: usize, op: &mut F) -> Result<f64, KernelError>
where
    F: FnMut() -> Result<(), KernelError>,
{
    if reps == 0 {
        return Err(KernelError::InvalidArguments("repetitions must be at least 1".into()));
    }
    let start = Instant::now();
    for _ in 0..reps {
        op()?;
    }
    let elapsed = start.elapsed();
    Ok(elapsed.as_nanos() as f64 / reps as f64)
}

/// Measures intervals until one sample is stored in `set`.
pub fn record_one<F>(set: &mut SampleSet, reps: usize, op: &mut F) -> Result<f64, KernelError>
where
    F: FnMut() -> Result<(), KernelError>,
{
    loop {
        let ns = time_interval(reps, op)?;
        match set.record(ns)? {
            Recorded::Stored => return Ok(ns),
            Recorded::Discarded => {
                trace!(title = set.title(), ns, "discarded sample, measuring again");
            }
        }
    }
}

/// Measures intervals until `set` is full.
pub fn fill<F>(set: &mut SampleSet, reps: usize, op: &mut F) -> Result<(), KernelError>
where
    F: FnMut() -> Result<(), KernelError>,
{
    while !set.is_full() {
        record_one(set, reps, op)?;
    }
    Ok(())
}

/// Collects [`MAX_SAMPLES`] samples of `op` and summarises them.
pub fn measure<F>(
    title: &str,
    workload: Workload,
    reps: usize,
    mut op: F,
) -> Result<Stats, KernelError>
where
    F: FnMut() -> Result<(), KernelError>,
{
    let mut set = SampleSet::new(title, workload);
    fill(&mut set, reps, &mut op)?;
    debug_assert_eq!(set.len(), MAX_SAMPLES);
    set.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_op_reps_times_per_sample() {
        let mut calls = 0usize;
        let stats = measure("count", Workload::Krylov { size: 1 }, 4, || {
            calls += 1;
            std::thread::sleep(std::time::Duration::from_micros(1));
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 4 * MAX_SAMPLES);
        assert!(stats.min > 0.0);
        assert!(stats.min <= stats.median && stats.median <= stats.max);
    }

    #[test]
    fn kernel_errors_abort_the_measurement() {
        let err = measure("fail", Workload::Krylov { size: 1 }, 2, || {
            Err(KernelError::InvalidArguments("boom".into()))
        })
        .unwrap_err();
        assert!(matches!(err, KernelError::InvalidArguments(_)));
    }

    #[test]
    fn zero_reps_is_rejected() {
        let mut op = || -> Result<(), KernelError> { Ok(()) };
        assert!(time_interval(0, &mut op).is_err());
    }
}
