// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Error Types** - *Kernel and Benchmark Error Handling*
//!
//! Error types for kernels, drivers and their inputs with structured error reporting.
//!
//! ## Error Categories
//! - **Precondition Errors**: Zero extents and undersized buffers
//! - **Allocation Errors**: Buffers whose size cannot be represented
//! - **Input Errors**: Malformed matrix files and unwritable report destinations
//! - **Runtime Errors**: Worker pool construction failures
//!
//! Numerical breakdown of the Gram-Schmidt process is *not* an error; see
//! [`crate::krylov::gram_schmidt::ArnoldiStatus`].

use core::fmt;
use std::error::Error;

/// Error type for all kernel, driver and input operations.
///
/// Each variant includes a contextual message string providing specific details
/// about the error condition.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Invalid arguments provided to a kernel, e.g. a zero extent.
    InvalidArguments(String),

    /// Buffer length does not match the extents handed to a kernel.
    LengthMismatch(String),

    /// A buffer of the requested size cannot be allocated.
    Allocation(String),

    /// Malformed matrix input.
    Parse(String),

    /// Unreadable input or unwritable output destination.
    Io(String),

    /// The worker pool could not be built.
    ThreadPool(String),
}

impl KernelError {
    /// Fatal errors stop the whole run; every other error only skips the
    /// benchmark that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KernelError::Parse(_) | KernelError::Io(_))
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            KernelError::LengthMismatch(msg) => write!(f, "Length mismatch: {}", msg),
            KernelError::Allocation(msg) => write!(f, "Allocation failure: {}", msg),
            KernelError::Parse(msg) => write!(f, "Parse error: {}", msg),
            KernelError::Io(msg) => write!(f, "I/O error: {}", msg),
            KernelError::ThreadPool(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl Error for KernelError {}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::Io(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for KernelError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        KernelError::ThreadPool(err.to_string())
    }
}

/// Creates a formatted error message for a buffer shorter than its extents require.
///
/// # Arguments
/// * `fname` - Function name where the mismatch occurred
/// * `buffer` - Name of the offending buffer
/// * `expected` - Minimum length implied by the extents
/// * `actual` - Length of the buffer
///
/// # Returns
/// A formatted error message string
pub fn log_length_mismatch(fname: &str, buffer: &str, expected: usize, actual: usize) -> String {
    format!(
        "{} => `{}` holds {} elements, extents require {}",
        fname, buffer, actual, expected
    )
}
