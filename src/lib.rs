//! This file is the root of the `tabframe` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`frame`, `binary`,
//!     `mapping`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the public codec surface at the crate root, so callers
//!     reach everything through `tabframe::...` without learning the module
//!     layout first.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod binary;
pub mod config;
pub mod error;
pub mod frame;
pub mod kernels;
pub mod mapping;
pub mod observability;
pub mod shape;
pub mod types;

mod utils;

//==================================================================================
// 2. Public API
//==================================================================================
pub use binary::{decode_frame, encode_frame, encode_frame_with, inspect, BufferSummary};
pub use config::{CodecConfig, CompressionProfile};
pub use error::TabframeError;
pub use frame::{ColumnLabels, Frame, FrameIndex, DEFAULT_REL_TOL};
pub use mapping::{
    from_canonical_mapping, from_mapping, from_mapping_json, to_mapping, CanonicalMapping,
};
pub use observability::enable_verbose_logging;
pub use shape::{ColumnShape, RawPayload};
pub use types::{IndexKind, Label, Scalar};
