//! This module defines the core, strongly-typed label and tag representations
//! used throughout the tabframe codecs.
//!
//! It currently includes the canonical `Scalar` and `Label` enums which replace
//! fragile stringly-typed labels with safe, serializable values, and the
//! `IndexKind` tag carried by the binary schema.

pub mod scalar;

// Re-export the main types for easier access.
pub use scalar::{IndexKind, Label, Scalar};
