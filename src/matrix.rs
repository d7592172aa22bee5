// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Dense Matrix Container** - *Aligned Row-Major Storage for the Kernels*
//!
//! A [`Matrix`] owns a contiguous, 64-byte aligned, row-major buffer of `f64`
//! together with its `rows × cols` extents. A vector is a matrix with one extent
//! equal to 1 ([`Vector`] is an alias).
//!
//! The buffer is a Minarrow `Vec64`, so alignment holds for the whole lifetime
//! of the matrix and the memory is released when the owner drops it.
//!
//! ## Construction
//! - [`Matrix::zeros`], [`Matrix::ones`], [`Matrix::random`] (uniform in `[-1, 1)`)
//! - [`Matrix::read_from`] / [`Matrix::parse`]: text format with a `rows cols`
//!   header followed by `rows * cols` whitespace-separated values, row-major
//! - [`Matrix::with_init`] dispatches on an [`Init`] mode
//!
//! Kernels never take a `Matrix`; they borrow its slice through
//! [`Matrix::as_slice`] / [`Matrix::as_mut_slice`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use minarrow::Vec64;
use rand::Rng;

use crate::errors::KernelError;

/// A matrix with one extent equal to 1.
pub type Vector = Matrix;

/// Initialisation mode of a new matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    Zeros,
    Ones,
    /// Uniformly distributed in `[-1, 1)`.
    Uniform,
    /// Read from a text file; the extents stored in the file win.
    File(PathBuf),
}

/// Dense row-major matrix of `f64` on a 64-byte aligned buffer.
pub struct Matrix {
    data: Vec64<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Element count for `rows × cols`, rejecting sizes no allocation can hold.
    fn checked_len(rows: usize, cols: usize) -> Result<usize, KernelError> {
        let len = rows.checked_mul(cols).ok_or_else(|| {
            KernelError::Allocation(format!("{} x {} elements overflow usize", rows, cols))
        })?;
        match len.checked_mul(std::mem::size_of::<f64>()) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(len),
            _ => Err(KernelError::Allocation(format!(
                "{} x {} doubles exceed the addressable size",
                rows, cols
            ))),
        }
    }

    /// Empty buffer with room for `rows × cols` elements; an allocator
    /// refusal is reported as `Allocation`.
    fn reserve(rows: usize, cols: usize) -> Result<(Vec64<f64>, usize), KernelError> {
        let len = Self::checked_len(rows, cols)?;
        let mut data = Vec64::new();
        data.try_reserve_exact(len).map_err(|e| {
            KernelError::Allocation(format!("{} x {} doubles: {}", rows, cols, e))
        })?;
        Ok((data, len))
    }

    fn filled(rows: usize, cols: usize, value: f64) -> Result<Self, KernelError> {
        let (mut data, len) = Self::reserve(rows, cols)?;
        data.resize(len, value);
        Ok(Self { data, rows, cols })
    }

    /// New `rows × cols` matrix of zeroes.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, KernelError> {
        Self::filled(rows, cols, 0.0)
    }

    /// New `rows × cols` matrix of ones.
    pub fn ones(rows: usize, cols: usize) -> Result<Self, KernelError> {
        Self::filled(rows, cols, 1.0)
    }

    /// New `rows × cols` matrix drawn uniformly from `[-1, 1)`.
    pub fn random<R: Rng>(
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<Self, KernelError> {
        let (mut data, len) = Self::reserve(rows, cols)?;
        for _ in 0..len {
            data.push(rng.random_range(-1.0..1.0));
        }
        Ok(Self { data, rows, cols })
    }

    /// Column vector of `len` zeroes.
    pub fn vector_zeros(len: usize) -> Result<Vector, KernelError> {
        Self::zeros(len, 1)
    }

    /// Column vector of `len` ones.
    pub fn vector_ones(len: usize) -> Result<Vector, KernelError> {
        Self::ones(len, 1)
    }

    /// Column vector of `len` uniform values in `[-1, 1)`.
    pub fn vector_random<R: Rng>(len: usize, rng: &mut R) -> Result<Vector, KernelError> {
        Self::random(len, 1, rng)
    }

    /// Builds a matrix from row-major `values`.
    pub fn from_row_major(rows: usize, cols: usize, values: &[f64]) -> Result<Self, KernelError> {
        let len = Self::checked_len(rows, cols)?;
        if values.len() != len {
            return Err(KernelError::LengthMismatch(format!(
                "from_row_major => {} x {} needs {} values, got {}",
                rows,
                cols,
                len,
                values.len()
            )));
        }
        let (mut data, _) = Self::reserve(rows, cols)?;
        data.extend_from_slice(values);
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix according to `init`.
    ///
    /// For [`Init::File`] the requested extents are ignored in favour of the
    /// ones stored in the file.
    pub fn with_init<R: Rng>(
        init: &Init,
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<Self, KernelError> {
        match init {
            Init::Zeros => Self::zeros(rows, cols),
            Init::Ones => Self::ones(rows, cols),
            Init::Uniform => Self::random(rows, cols, rng),
            Init::File(path) => Self::read_from(path),
        }
    }

    /// Reads a matrix from a text file.
    ///
    /// Any failure is reported as a fatal error (`Io` or `Parse`).
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, KernelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            KernelError::Io(format!("failed to open `{}`: {}", path.display(), e))
        })?;
        Self::parse(&text).map_err(|e| match e {
            KernelError::Parse(msg) => KernelError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parses the `rows cols` header followed by `rows * cols` values.
    pub fn parse(text: &str) -> Result<Self, KernelError> {
        let mut tokens = text.split_whitespace();
        let rows = parse_extent(tokens.next(), "rows")?;
        let cols = parse_extent(tokens.next(), "cols")?;
        let (mut data, len) = Self::reserve(rows, cols)?;
        for idx in 0..len {
            let token = tokens.next().ok_or_else(|| {
                KernelError::Parse(format!("expected {} values, found {}", len, idx))
            })?;
            let value: f64 = token.parse().map_err(|_| {
                KernelError::Parse(format!("value #{} `{}` is not a number", idx, token))
            })?;
            data.push(value);
        }
        if let Some(extra) = tokens.next() {
            return Err(KernelError::Parse(format!(
                "unexpected trailing token `{}` after {} values",
                extra, len
            )));
        }
        Ok(Self { data, rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements, `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data[..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data[..]
    }

    /// Element `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "get: ({}, {}) out of bounds", i, j);
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.rows && j < self.cols, "set: ({}, {}) out of bounds", i, j);
        self.data[i * self.cols + j] = value;
    }

    /// Copies column `j` into the first `rows` elements of `out`.
    #[inline]
    pub fn column_into(&self, j: usize, out: &mut [f64]) {
        assert!(j < self.cols, "column_into: column {} out of bounds", j);
        let cols = self.cols;
        for (i, dst) in out[..self.rows].iter_mut().enumerate() {
            *dst = self.data[i * cols + j];
        }
    }

    /// Overwrites column `j` with `src[i] * scale`.
    #[inline]
    pub fn set_column_scaled(&mut self, j: usize, src: &[f64], scale: f64) {
        assert!(j < self.cols, "set_column_scaled: column {} out of bounds", j);
        let cols = self.cols;
        for (i, &v) in src[..self.rows].iter().enumerate() {
            self.data[i * cols + j] = v * scale;
        }
    }

    /// Zero-cost vector transpose: swaps the extents, the buffer is untouched.
    ///
    /// Only vectors can be transposed in place; use [`Matrix::transposed`] for
    /// general matrices.
    pub fn transpose_in_place(&mut self) -> Result<(), KernelError> {
        if !self.is_vector() {
            return Err(KernelError::InvalidArguments(format!(
                "transpose_in_place: {} x {} is not a vector",
                self.rows, self.cols
            )));
        }
        std::mem::swap(&mut self.rows, &mut self.cols);
        Ok(())
    }

    /// New matrix holding the transpose.
    pub fn transposed(&self) -> Result<Matrix, KernelError> {
        let mut out = Matrix::zeros(self.cols, self.rows)?;
        let (rows, cols) = (self.rows, self.cols);
        for i in 0..rows {
            for j in 0..cols {
                out.data[j * rows + i] = self.data[i * cols + j];
            }
        }
        Ok(out)
    }

    /// Explicit deep copy.
    pub fn copy(&self) -> Result<Matrix, KernelError> {
        let (mut data, _) = Self::reserve(self.rows, self.cols)?;
        data.extend_from_slice(self.as_slice());
        Ok(Self {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }
}

fn parse_extent(token: Option<&str>, what: &str) -> Result<usize, KernelError> {
    let token = token.ok_or_else(|| KernelError::Parse(format!("missing `{}` extent", what)))?;
    let value: usize = token
        .parse()
        .map_err(|_| KernelError::Parse(format!("`{}` extent `{}` is not an integer", what, token)))?;
    if value == 0 {
        return Err(KernelError::Parse(format!("`{}` extent must be non-zero", what)));
    }
    Ok(value)
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Matrix");
        s.field("rows", &self.rows).field("cols", &self.cols);
        if self.len() <= crate::config::MAX_PRINT_LEN * crate::config::MAX_PRINT_LEN {
            s.field("data", &self.as_slice());
        }
        s.finish()
    }
}
