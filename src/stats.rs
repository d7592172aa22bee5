// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Statistics Engine** - *Latency Samples and Derived Metrics*
//!
//! A [`SampleSet`] collects exactly [`MAX_SAMPLES`] per-repetition latencies
//! (nanoseconds) for one benchmark. Once full it is consumed by
//! [`SampleSet::finish`] into an immutable [`Stats`] record.
//!
//! ## Metrics
//! - `min`, `max`, `median` of the sorted samples
//! - arithmetic `mean`
//! - `stddevp`: Bessel-corrected standard deviation as a percentage of the mean
//! - [`Throughput`] for kernel workloads: GiB/s of operand memory and GFLOP/s
//! - optional [`Residuals`] attached by the Krylov drivers

use crate::config::{BlasLevel, MAX_SAMPLES, ONE_GIB};
use crate::errors::KernelError;

/// What a benchmark measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Workload {
    /// A BLAS kernel over `elements` doubles performing `flops` operations.
    Kernel {
        level: BlasLevel,
        threads: usize,
        elements: usize,
        flops: u64,
    },
    /// One Gram-Schmidt Arnoldi run on a `size × size` matrix.
    Krylov { size: usize },
}

impl Workload {
    /// Bytes of operand memory touched, 8 per element.
    pub fn bytes(&self) -> Option<u64> {
        match *self {
            Workload::Kernel { elements, .. } => {
                Some(elements as u64 * std::mem::size_of::<f64>() as u64)
            }
            Workload::Krylov { .. } => None,
        }
    }

    /// Floating-point operations per kernel call.
    pub fn flops(&self) -> Option<u64> {
        match *self {
            Workload::Kernel { flops, .. } => Some(flops),
            Workload::Krylov { .. } => None,
        }
    }
}

/// Memory and arithmetic throughput derived from the mean latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub mem_gibs: f64,
    pub gflops: f64,
}

/// Frobenius norms of the Krylov outputs `Q` and `H`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residuals {
    pub q: f64,
    pub h: f64,
}

/// Outcome of [`SampleSet::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Stored,
    /// Non-positive or non-finite; the caller should measure again.
    Discarded,
}

/// Fixed-capacity latency collector.
#[derive(Debug, Clone)]
pub struct SampleSet {
    title: String,
    workload: Workload,
    samples: [f64; MAX_SAMPLES],
    len: usize,
    residuals: Option<Residuals>,
}

impl SampleSet {
    pub fn new(title: impl Into<String>, workload: Workload) -> Self {
        Self {
            title: title.into(),
            workload,
            samples: [0.0; MAX_SAMPLES],
            len: 0,
            residuals: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_SAMPLES
    }

    /// Adds one latency in nanoseconds.
    pub fn record(&mut self, ns: f64) -> Result<Recorded, KernelError> {
        if self.is_full() {
            return Err(KernelError::InvalidArguments(format!(
                "{}: sample set already holds {} samples",
                self.title, MAX_SAMPLES
            )));
        }
        if !ns.is_finite() || ns <= 0.0 {
            return Ok(Recorded::Discarded);
        }
        self.samples[self.len] = ns;
        self.len += 1;
        Ok(Recorded::Stored)
    }

    pub fn set_residuals(&mut self, residuals: Residuals) {
        self.residuals = Some(residuals);
    }

    /// Consumes the full set and derives its statistics.
    pub fn finish(self) -> Result<Stats, KernelError> {
        if !self.is_full() {
            return Err(KernelError::InvalidArguments(format!(
                "{}: {} of {} samples collected",
                self.title, self.len, MAX_SAMPLES
            )));
        }
        let mut stats = Stats::compute(self.title, self.workload, &self.samples)?;
        stats.residuals = self.residuals;
        Ok(stats)
    }
}

/// Derived, read-only benchmark statistics. Latencies are in nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub title: String,
    pub workload: Workload,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub median: f64,
    pub stddevp: f64,
    pub throughput: Option<Throughput>,
    pub residuals: Option<Residuals>,
}

impl Stats {
    /// Computes statistics over `samples` without modifying them.
    ///
    /// The median is the middle element of the sorted samples (the upper
    /// middle for an even count).
    pub fn compute(
        title: impl Into<String>,
        workload: Workload,
        samples: &[f64],
    ) -> Result<Self, KernelError> {
        let title = title.into();
        if samples.is_empty() {
            return Err(KernelError::InvalidArguments(format!(
                "{}: no samples to summarise",
                title
            )));
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let stddev = if n > 1 {
            let var = sorted.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        let mean_s = mean / 1e9;
        let throughput = workload
            .bytes()
            .zip(workload.flops())
            .map(|(bytes, flops)| Throughput {
                mem_gibs: bytes as f64 / ONE_GIB / mean_s,
                gflops: (flops as f64 / 1e9) / mean_s,
            });

        Ok(Self {
            title,
            workload,
            min: sorted[0],
            mean,
            max: sorted[n - 1],
            median: sorted[n / 2],
            stddevp: stddev * 100.0 / mean,
            throughput,
            residuals: None,
        })
    }
}
