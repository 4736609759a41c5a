// In: src/error.rs

//! This module defines the single, unified error type for the entire tabframe library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabframeError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// A mapping payload whose shape matches none of the accepted forms, or
    /// whose contents violate the form it matched (ragged rows, non-numeric
    /// cells, inconsistent nested keys).
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Hierarchical column labels whose tuples do not all share one arity.
    #[error("Inconsistent label arity: expected {0}, found {1}")]
    InconsistentArity(usize, usize),

    /// A binary buffer that is not a valid encoded frame.
    #[error("Corrupt frame buffer: {0}")]
    CorruptBuffer(String),

    #[error("Frame shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unsupported value for this operation: {0}")]
    UnsupportedType(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during schema serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for TabframeError {
    fn from(err: bytemuck::PodCastError) -> Self {
        TabframeError::PodCast(err.to_string())
    }
}
