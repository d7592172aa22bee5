// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

// The constants should rarely need adjustment.

//! # **Configuration** - *Benchmark Constants and Run Parameters*
//!
//! Compile-time constants controlling sample counts, alignment and numerical
//! tolerances, plus the resolved run configuration handed to every driver.
//! Nothing in here is process-global: drivers receive a [`BenchConfig`] by
//! reference.

use crate::errors::KernelError;

/// Number of latency samples collected per benchmark.
///
/// Odd so that the median is a single element of the sorted samples.
pub const MAX_SAMPLES: usize = 31;

/// Byte alignment of every matrix buffer.
pub const ALIGNMENT: usize = 64;

/// Vector length used by BLAS1 benchmarks when no shape is given.
pub const DEFAULT_VECTOR_LEN: usize = 65_536;

/// Square matrix extent used by BLAS2/BLAS3 benchmarks when no shape is given.
pub const DEFAULT_MATRIX_LEN: usize = 512;

/// Worker count used when parallel mode is requested without a thread count.
pub const DEFAULT_THREADS: usize = 8;

/// Kernel repetitions per timed interval.
pub const DEFAULT_REPS: usize = 1000;

/// Seed of the operand generator.
pub const DEFAULT_SEED: u64 = 0;

/// Residual norm below which the Krylov sequence is considered linearly dependent.
pub const BREAKDOWN_EPSILON: f64 = 1e-12;

/// Maximum relative disagreement between CGS and MGS residual norms.
pub const ERR_TOL: f64 = 1e-6;

/// Matrices with at most `MAX_PRINT_LEN²` elements show their data in `Debug` output.
pub const MAX_PRINT_LEN: usize = 12;

/// Bytes per GiB.
pub const ONE_GIB: f64 = 1_073_741_824.0;

/// A single BLAS level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlasLevel {
    One,
    Two,
    Three,
}

impl BlasLevel {
    /// Numeric level as printed in reports.
    pub fn as_u8(self) -> u8 {
        match self {
            BlasLevel::One => 1,
            BlasLevel::Two => 2,
            BlasLevel::Three => 3,
        }
    }
}

/// Set of BLAS levels selected for a run.
///
/// Selecting nothing means every level runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlasLevels {
    one: bool,
    two: bool,
    three: bool,
}

impl BlasLevels {
    pub fn all() -> Self {
        Self {
            one: true,
            two: true,
            three: true,
        }
    }

    pub fn with(mut self, level: BlasLevel) -> Self {
        match level {
            BlasLevel::One => self.one = true,
            BlasLevel::Two => self.two = true,
            BlasLevel::Three => self.three = true,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        !(self.one || self.two || self.three)
    }

    /// True when `level` runs; an empty selection runs everything.
    pub fn contains(&self, level: BlasLevel) -> bool {
        if self.is_empty() {
            return true;
        }
        match level {
            BlasLevel::One => self.one,
            BlasLevel::Two => self.two,
            BlasLevel::Three => self.three,
        }
    }
}

impl std::fmt::Display for BlasLevels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = [
            (BlasLevel::One, "BLAS1"),
            (BlasLevel::Two, "BLAS2"),
            (BlasLevel::Three, "BLAS3"),
        ]
        .iter()
        .filter(|(lvl, _)| self.contains(*lvl))
        .map(|(_, name)| *name)
        .collect();
        if names.len() == 3 {
            write!(f, "all BLAS levels")
        } else {
            write!(f, "{}", names.join(" & "))
        }
    }
}

/// Problem size, resolved once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemShape {
    /// `len`-element vectors and `len × len` matrices.
    Square { len: usize },
    /// `rows × cols` matrices and `rows * cols`-element vectors.
    Rect { rows: usize, cols: usize },
}

impl ProblemShape {
    /// Resolves the optional `--len`, `--rows` and `--cols` inputs.
    ///
    /// `len` and a `rows`/`cols` pair are mutually exclusive; a lone `rows`
    /// or `cols` is rejected.
    pub fn resolve(
        len: Option<usize>,
        rows: Option<usize>,
        cols: Option<usize>,
    ) -> Result<Option<Self>, KernelError> {
        let shape = match (len, rows, cols) {
            (None, None, None) => return Ok(None),
            (Some(len), None, None) => ProblemShape::Square { len },
            (None, Some(rows), Some(cols)) => ProblemShape::Rect { rows, cols },
            (Some(_), _, _) => {
                return Err(KernelError::InvalidArguments(
                    "`len` cannot be combined with `rows`/`cols`".into(),
                ))
            }
            _ => {
                return Err(KernelError::InvalidArguments(
                    "`rows` and `cols` must be given together".into(),
                ))
            }
        };
        if shape.vector_len() == 0 {
            return Err(KernelError::InvalidArguments(
                "problem extents must be non-zero".into(),
            ));
        }
        Ok(Some(shape))
    }

    /// Flat element count used for BLAS1 vectors.
    pub fn vector_len(&self) -> usize {
        match *self {
            ProblemShape::Square { len } => len,
            ProblemShape::Rect { rows, cols } => rows.saturating_mul(cols),
        }
    }

    /// `(rows, cols)` used for BLAS2/BLAS3 matrices.
    pub fn matrix_dims(&self) -> (usize, usize) {
        match *self {
            ProblemShape::Square { len } => (len, len),
            ProblemShape::Rect { rows, cols } => (rows, cols),
        }
    }
}

/// Run configuration for the BLAS benchmark suites.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Worker threads; `0` or `1` selects the sequential kernels.
    pub threads: usize,
    /// Kernel repetitions per timed interval.
    pub reps: usize,
    /// Seed of the operand generator.
    pub seed: u64,
    pub shape: Option<ProblemShape>,
    pub levels: BlasLevels,
    pub verbose: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            reps: DEFAULT_REPS,
            seed: DEFAULT_SEED,
            shape: None,
            levels: BlasLevels::all(),
            verbose: false,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.reps == 0 {
            return Err(KernelError::InvalidArguments(
                "repetitions must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn vector_len(&self) -> usize {
        self.shape
            .map(|s| s.vector_len())
            .unwrap_or(DEFAULT_VECTOR_LEN)
    }

    pub fn matrix_dims(&self) -> (usize, usize) {
        self.shape
            .map(|s| s.matrix_dims())
            .unwrap_or((DEFAULT_MATRIX_LEN, DEFAULT_MATRIX_LEN))
    }
}
