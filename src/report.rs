// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Report Writer** - *Semicolon-Separated Benchmark Results*
//!
//! One header line followed by one line per [`Stats`] record, either on
//! stdout or in a file that is truncated when the report is created.
//!
//! ```text
//! #title; BLAS_lvl; threads; elems; min; mean; max; median; stddevp; GIB/s; GFLOP/s
//! ddot; 1; 1; 131072; 25102.331; 25871.094; 27660.980; 25803.450; 2.213%; 37.744; 10.132
//! ```
//!
//! Latencies are in nanoseconds. Krylov reports use the shorter
//! `#title; size; min; mean; max; median; stddevp` layout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::errors::KernelError;
use crate::stats::{Stats, Workload};

pub const KERNEL_HEADER: &str =
    "#title; BLAS_lvl; threads; elems; min; mean; max; median; stddevp; GIB/s; GFLOP/s";
pub const KRYLOV_HEADER: &str = "#title; size; min; mean; max; median; stddevp";

/// Report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Kernel,
    Krylov,
}

impl ReportKind {
    pub fn header(self) -> &'static str {
        match self {
            ReportKind::Kernel => KERNEL_HEADER,
            ReportKind::Krylov => KRYLOV_HEADER,
        }
    }
}

/// Formats one record; the layout follows the record's workload.
pub fn format_line(stats: &Stats) -> String {
    match stats.workload {
        Workload::Kernel {
            level,
            threads,
            elements,
            ..
        } => {
            let (gib, gflop) = stats
                .throughput
                .map_or((0.0, 0.0), |t| (t.mem_gibs, t.gflops));
            format!(
                "{}; {}; {}; {}; {:.3}; {:.3}; {:.3}; {:.3}; {:.3}%; {:.3}; {:.3}",
                stats.title,
                level.as_u8(),
                threads,
                elements,
                stats.min,
                stats.mean,
                stats.max,
                stats.median,
                stats.stddevp,
                gib,
                gflop
            )
        }
        Workload::Krylov { size } => format!(
            "{}; {}; {:.3}; {:.3}; {:.3}; {:.3}; {:.3}%",
            stats.title, size, stats.min, stats.mean, stats.max, stats.median, stats.stddevp
        ),
    }
}

/// An open report destination.
pub struct Report {
    kind: ReportKind,
    out: Box<dyn Write + Send>,
}

impl Report {
    /// Writes the header to `path`, or to stdout when `path` is `None`.
    ///
    /// An existing file is truncated.
    pub fn create(path: Option<&Path>, kind: ReportKind) -> Result<Self, KernelError> {
        let out: Box<dyn Write + Send> = match path {
            Some(p) => {
                let file = File::create(p).map_err(|e| {
                    KernelError::Io(format!("failed to open output file `{}`: {}", p.display(), e))
                })?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout()),
        };
        Self::from_writer(out, kind)
    }

    /// Writes the header to an arbitrary sink.
    pub fn from_writer(out: Box<dyn Write + Send>, kind: ReportKind) -> Result<Self, KernelError> {
        let mut report = Self { kind, out };
        report.write_line(kind.header())?;
        Ok(report)
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Appends one record.
    pub fn append(&mut self, stats: &Stats) -> Result<(), KernelError> {
        let matches = matches!(
            (self.kind, &stats.workload),
            (ReportKind::Kernel, Workload::Kernel { .. }) | (ReportKind::Krylov, Workload::Krylov { .. })
        );
        if !matches {
            return Err(KernelError::InvalidArguments(format!(
                "`{}` does not belong in a {:?} report",
                stats.title, self.kind
            )));
        }
        self.write_line(&format_line(stats))
    }

    fn write_line(&mut self, line: &str) -> Result<(), KernelError> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}
