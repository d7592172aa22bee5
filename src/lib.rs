// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under the Mozilla Public License (MPL) 2.0.
// See LICENSE for details.

// std::simd is nightly-only; the `simd` feature opts into it for the
// aligned dot / nrm2 paths.
#![cfg_attr(feature = "simd", feature(portable_simd))]

// Link OpenBLAS when linear_algebra feature is enabled.
// This forces the linker to include the OpenBLAS symbols.
#[cfg(feature = "linear_algebra")]
extern crate openblas_src;

// compile with RUSTFLAGS="-C target-cpu=native" cargo +nightly build --features simd

pub mod kernels {
    pub mod backend;
    pub mod blas1;
    pub mod blas2;
    pub mod blas3;
    #[cfg(feature = "linear_algebra")]
    pub mod reference;
}

pub mod krylov {
    pub mod gram_schmidt;
}

pub mod bench {
    pub mod blas;
    pub mod executor;
    pub mod krylov;
    pub mod timing;
}

pub mod matrix;
pub mod report;
pub mod stats;

pub mod config;
pub mod errors;

pub mod utils;
