// In: src/config.rs

//! The single source of truth for all tabframe codec configuration.
//!
//! This module defines the unified `CodecConfig` struct, which is designed to
//! be created once at the application boundary (e.g., from a service's config
//! file) and then passed down via a shared, read-only `Arc<CodecConfig>`.

use serde::{Deserialize, Serialize};

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Defines the trade-off between encoding speed and final buffer size.
///
/// This is the only knob the binary codec exposes; it never changes what a
/// buffer decodes to, only how hard the entropy coder works producing it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionProfile {
    /// Prioritizes speed over size. Uses a low Zstd level.
    Fast,

    /// A balance between speed and size. This is the recommended default.
    #[default]
    Balanced,

    /// Prioritizes the smallest possible buffer at the cost of CPU time.
    HighCompression,
}

impl CompressionProfile {
    /// The Zstd level applied to every payload stream under this profile.
    pub fn zstd_level(&self) -> i32 {
        match self {
            Self::Fast => 1,
            Self::Balanced => 3,
            Self::HighCompression => 12,
        }
    }
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

/// The single, unified configuration for the encode path.
///
/// Decoding is configuration-free: buffers are self-describing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// The primary profile guiding the compression/speed trade-off.
    #[serde(default)]
    pub profile: CompressionProfile,
}
