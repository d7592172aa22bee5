// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! Micro-benchmark harness for the BLAS kernels and Krylov Gram-Schmidt.
//!
//! # Usage
//!
//! ```bash
//! # BLAS1 and BLAS3 on 4 threads, 200 repetitions per sample, into a file
//! mini-blas blas -1 -3 -p 4 -r 200 -o blas.csv
//!
//! # every BLAS level on 1000 x 500 matrices, sequential
//! mini-blas blas --rows 1000 --cols 500
//!
//! # CGS vs MGS on a random 256 x 256 matrix, degree 32, 50 repetitions
//! mini-blas krylov 256 32 50 krylov.csv
//! ```
//!
//! Logs go to stderr (`RUST_LOG` or `-v`), results to stdout or `OUTFILE`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mini_blas::bench::blas::{Outcome, blas1_runs, blas2_runs, blas3_runs};
use mini_blas::bench::executor::Executor;
use mini_blas::bench::krylov::krylov_runs;
use mini_blas::config::{
    BenchConfig, BlasLevel, BlasLevels, DEFAULT_REPS, DEFAULT_SEED, DEFAULT_THREADS, ProblemShape,
};
use mini_blas::matrix::{Init, Matrix};
use mini_blas::report::{Report, ReportKind};

#[derive(Parser, Debug)]
#[command(name = "mini-blas")]
#[command(about = "Benchmark BLAS level 1-3 kernels and Krylov Gram-Schmidt")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark the BLAS kernels
    Blas(BlasArgs),
    /// Benchmark classical vs modified Gram-Schmidt Arnoldi
    Krylov(KrylovArgs),
}

#[derive(clap::Args, Debug)]
struct BlasArgs {
    /// Run the BLAS1 benchmarks
    #[arg(short = '1')]
    one: bool,

    /// Run the BLAS2 benchmarks
    #[arg(short = '2')]
    two: bool,

    /// Run the BLAS3 benchmarks
    #[arg(short = '3')]
    three: bool,

    /// Run every BLAS level (the default when no level is selected)
    #[arg(short, long)]
    all: bool,

    /// Use the parallel kernels, optionally with an explicit thread count (1 runs sequentially)
    #[arg(short, long, value_name = "THREADS", num_args = 0..=1)]
    parallel: Option<Option<usize>>,

    /// Kernel repetitions per sample
    #[arg(short, long, default_value_t = DEFAULT_REPS)]
    reps: usize,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Vector length and square matrix extent
    #[arg(long, conflicts_with_all = ["rows", "cols"])]
    len: Option<usize>,

    /// Matrix rows
    #[arg(long, requires = "cols")]
    rows: Option<usize>,

    /// Matrix columns
    #[arg(long, requires = "rows")]
    cols: Option<usize>,

    /// Seed of the operand generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct KrylovArgs {
    /// Extent of the square matrix A; a `--matrix` file's own extent wins
    size: usize,

    /// Krylov subspace degree
    degree: usize,

    /// Arnoldi runs per sample
    reps: usize,

    /// Output file; stdout when omitted
    outfile: Option<PathBuf>,

    /// Read A from a text file instead of generating it
    #[arg(long, value_name = "FILE")]
    matrix: Option<PathBuf>,

    /// Use the parallel kernels, optionally with an explicit thread count (1 runs sequentially)
    #[arg(short, long, value_name = "THREADS", num_args = 0..=1)]
    parallel: Option<Option<usize>>,

    /// Seed of the generator for A
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn thread_count(parallel: Option<Option<usize>>) -> usize {
    match parallel {
        None => 0,
        Some(None) => DEFAULT_THREADS,
        Some(Some(n)) => n,
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

impl BlasArgs {
    fn into_config(self) -> Result<(BenchConfig, Option<PathBuf>)> {
        let shape = ProblemShape::resolve(self.len, self.rows, self.cols)?;
        let mut levels = BlasLevels::default();
        if self.all {
            levels = BlasLevels::all();
        }
        for (set, level) in [
            (self.one, BlasLevel::One),
            (self.two, BlasLevel::Two),
            (self.three, BlasLevel::Three),
        ] {
            if set {
                levels = levels.with(level);
            }
        }
        let cfg = BenchConfig {
            threads: thread_count(self.parallel),
            reps: self.reps,
            seed: self.seed,
            shape,
            levels,
            verbose: self.verbose,
        };
        cfg.validate()?;
        Ok((cfg, self.output))
    }
}

/// Appends successful outcomes; fatal errors abort, others skip the benchmark.
fn record(report: &mut Report, outcomes: Vec<Outcome>) -> Result<()> {
    for (title, outcome) in outcomes {
        match outcome {
            Ok(stats) => report.append(&stats)?,
            Err(e) if e.is_fatal() => bail!("{title}: {e}"),
            Err(e) => warn!(title, error = %e, "benchmark skipped"),
        }
    }
    Ok(())
}

fn run_blas(args: BlasArgs) -> Result<()> {
    let (cfg, output) = args.into_config()?;
    info!(levels = %cfg.levels, threads = cfg.threads, reps = cfg.reps, "BLAS benchmarks");

    let mut report = Report::create(output.as_deref(), ReportKind::Kernel)?;
    let exec = Executor::new(cfg.threads)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    if cfg.levels.contains(BlasLevel::One) {
        record(&mut report, blas1_runs(&cfg, &exec, &mut rng))?;
    }
    if cfg.levels.contains(BlasLevel::Two) {
        record(&mut report, blas2_runs(&cfg, &exec, &mut rng))?;
    }
    if cfg.levels.contains(BlasLevel::Three) {
        record(&mut report, blas3_runs(&cfg, &exec, &mut rng))?;
    }
    Ok(())
}

/// Warns when the requested SIZE differs from the extent read from file.
fn file_extent_matches(requested: usize, a: &Matrix) -> bool {
    if requested == a.rows() {
        return true;
    }
    warn!(
        requested,
        rows = a.rows(),
        cols = a.cols(),
        "SIZE ignored, using the extent of the matrix file"
    );
    false
}

fn run_krylov(args: KrylovArgs) -> Result<()> {
    ensure!(args.reps >= 1, "repetitions must be at least 1");
    let init = match &args.matrix {
        Some(path) => Init::File(path.clone()),
        None => Init::Uniform,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);
    let a = Matrix::with_init(&init, args.size, args.size, &mut rng)
        .with_context(|| format!("failed to build A ({:?})", init))?;
    ensure!(
        a.rows() > 0 && a.rows() == a.cols(),
        "A must be square and non-empty, got {} x {}",
        a.rows(),
        a.cols()
    );
    if args.matrix.is_some() {
        file_extent_matches(args.size, &a);
    }
    let size = a.rows();
    let mut x = Matrix::vector_zeros(size)?;
    x.set(0, 0, 1.0);

    let threads = thread_count(args.parallel);
    info!(size, degree = args.degree, reps = args.reps, threads, "Krylov benchmarks");
    let mut report = Report::create(args.outfile.as_deref(), ReportKind::Krylov)?;
    let exec = Executor::new(threads)?;

    let run = krylov_runs(&exec, args.reps, &a, x.as_slice(), args.degree)?;
    report.append(&run.cgs)?;
    report.append(&run.mgs)?;
    info!(agree = run.agreement.holds(), "Krylov benchmarks done");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Blas(args) => {
            init_tracing(args.verbose);
            run_blas(args)
        }
        Command::Krylov(args) => {
            init_tracing(args.verbose);
            run_krylov(args)
        }
    }
}

#[cfg(test)]
mod tests {
    use mini_blas::kernels::backend::Backend;

    use super::*;

    #[test]
    fn file_extent_overrides_requested_size() {
        let a = Matrix::from_row_major(2, 2, &[4.0, 1.0, 1.0, 4.0]).unwrap();
        assert!(file_extent_matches(2, &a));
        assert!(!file_extent_matches(10, &a));
    }

    #[test]
    fn krylov_with_matrix_file_ignores_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "3 3\n2 1 0\n1 2 1\n0 1 2\n").unwrap();
        let out = dir.path().join("krylov.csv");
        let cli = Cli::try_parse_from([
            "mini-blas",
            "krylov",
            "10",
            "2",
            "1",
            out.to_str().unwrap(),
            "--matrix",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let Command::Krylov(args) = cli.command else {
            panic!("expected krylov subcommand");
        };
        run_krylov(args).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("cgs; 3; "));
    }

    #[test]
    fn one_parallel_thread_runs_sequentially() {
        let cli = Cli::try_parse_from(["mini-blas", "blas", "-1", "-p", "1"]).unwrap();
        let Command::Blas(args) = cli.command else {
            panic!("expected blas subcommand");
        };
        let (cfg, _) = args.into_config().unwrap();
        assert_eq!(cfg.threads, 1);
        assert_eq!(Executor::new(cfg.threads).unwrap().backend(), Backend::Sequential);

        let cli = Cli::try_parse_from(["mini-blas", "blas", "-p"]).unwrap();
        let Command::Blas(args) = cli.command else {
            panic!("expected blas subcommand");
        };
        assert_eq!(args.into_config().unwrap().0.threads, DEFAULT_THREADS);
    }
}
