// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under Mozilla Public License (MPL) 2.0.

//! # **Utility Functions** - *Buffer Validation and Numerical Helpers*
//!
//! Helpers shared by the kernels, the Krylov engine and the drivers.

use num_traits::Float;

use crate::errors::{KernelError, log_length_mismatch};

#[cfg(feature = "simd")]
mod lanes {
    include!(concat!(env!("OUT_DIR"), "/simd_lanes.rs"));
}

#[cfg(feature = "simd")]
pub use lanes::W64;

/// Validates that a kernel buffer holds at least the elements its extents require.
///
/// # Returns
/// `Ok(())` if `len >= required`, otherwise `KernelError::LengthMismatch` naming
/// the kernel and the buffer.
#[inline(always)]
pub fn confirm_min_len(
    fname: &str,
    buffer: &str,
    len: usize,
    required: usize,
) -> Result<(), KernelError> {
    if len < required {
        return Err(KernelError::LengthMismatch(log_length_mismatch(
            fname, buffer, required, len,
        )));
    }
    Ok(())
}

/// True when any of the given buffer lengths is zero.
///
/// BLAS2/BLAS3 kernels treat an empty operand as "nothing to do".
#[inline(always)]
pub fn has_empty(lens: &[usize]) -> bool {
    lens.iter().any(|&l| l == 0)
}

/// Validates that every extent handed to a kernel is non-zero.
#[inline(always)]
pub fn confirm_nonzero_dims(fname: &str, dims: &[usize]) -> Result<(), KernelError> {
    if dims.iter().any(|&d| d == 0) {
        return Err(KernelError::InvalidArguments(format!(
            "{}: extents {:?} must all be non-zero",
            fname, dims
        )));
    }
    Ok(())
}

/// SIMD Alignment check. Returns true if the slice is properly
/// 64-byte aligned for SIMD operations, false otherwise.
#[inline(always)]
pub fn is_simd_aligned<T>(slice: &[T]) -> bool {
    if slice.is_empty() {
        true
    } else {
        (slice.as_ptr() as usize) % crate::config::ALIGNMENT == 0
    }
}

/// Relative error of `got` against `expected`.
///
/// Falls back to the absolute error when `expected` is zero.
#[inline]
pub fn relative_error<T: Float>(expected: T, got: T) -> T {
    let diff = (expected - got).abs();
    if expected == T::zero() {
        diff
    } else {
        diff / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_len_check() {
        assert!(confirm_min_len("dot", "x", 4, 4).is_ok());
        assert!(confirm_min_len("dot", "x", 5, 4).is_ok());
        let err = confirm_min_len("dot", "x", 3, 4).unwrap_err();
        assert!(matches!(err, KernelError::LengthMismatch(_)));
    }

    #[test]
    fn empty_detection() {
        assert!(has_empty(&[3, 0, 2]));
        assert!(!has_empty(&[3, 1, 2]));
        assert!(!has_empty(&[]));
    }

    #[test]
    fn zero_dims_rejected() {
        assert!(confirm_nonzero_dims("gemm", &[2, 3, 4]).is_ok());
        assert!(matches!(
            confirm_nonzero_dims("gemm", &[2, 0, 4]),
            Err(KernelError::InvalidArguments(_))
        ));
    }

    #[test]
    fn relative_error_scales() {
        assert_eq!(relative_error(2.0_f64, 2.0), 0.0);
        assert!((relative_error(4.0_f64, 3.0) - 0.25).abs() < 1e-15);
        assert!((relative_error(0.0_f64, 1e-3) - 1e-3).abs() < 1e-18);
        assert!((relative_error(-2.0_f32, -1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_slices_count_as_aligned() {
        let empty: [f64; 0] = [];
        assert!(is_simd_aligned(&empty));
    }
}
