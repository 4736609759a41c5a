//! This module collects the pure, stateless byte-level kernels used by the
//! binary frame codec.
//!
//! Kernels never know about frames or schemas; they transform byte buffers
//! and report failures through the unified error type.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Final stage: entropy coding for every payload stream.
pub mod zstd;
