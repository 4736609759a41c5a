//! This module contains the pure, stateless kernels for Zstandard compression
//! and decompression.
//!
//! Every payload stream in the binary frame format passes through here. The
//! encoded form prepends the uncompressed length so the decoder can validate
//! the stream against what the frame header promised. This module is a safe,
//! panic-free wrapper around the `zstd` crate.

use std::io::Write;

use crate::error::TabframeError;

//==================================================================================
// 1. Public API
//==================================================================================

/// Compresses a byte slice, prepending the uncompressed length as `u64` LE.
///
/// Empty input encodes to an empty stream.
pub fn encode(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, TabframeError> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut output_buf = Vec::with_capacity(input_bytes.len());

    let uncompressed_len: u64 = input_bytes.len() as u64;
    output_buf.extend_from_slice(&uncompressed_len.to_le_bytes());

    let mut encoder = zstd::stream::Encoder::new(&mut output_buf, level)
        .map_err(|e| TabframeError::ZstdError(e.to_string()))?;
    encoder
        .write_all(input_bytes)
        .map_err(|e| TabframeError::ZstdError(e.to_string()))?;
    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| TabframeError::ZstdError(e.to_string()))?;

    Ok(output_buf)
}

/// Decompresses a stream produced by [`encode`], validating the length header.
pub fn decode(input_bytes: &[u8]) -> Result<Vec<u8>, TabframeError> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }

    if input_bytes.len() < 8 {
        return Err(TabframeError::ZstdError(
            "Input stream too short to contain size header.".to_string(),
        ));
    }
    let len_bytes: [u8; 8] = input_bytes[0..8]
        .try_into()
        .map_err(|_| TabframeError::ZstdError("Unreadable size header.".to_string()))?;
    let uncompressed_len = u64::from_le_bytes(len_bytes) as usize;

    // The actual compressed data starts after the header.
    let compressed_data = &input_bytes[8..];

    // Capacity is a hint only; the header is untrusted until the final check.
    let mut decompressed_data = Vec::with_capacity(uncompressed_len.min(1 << 20));
    zstd::stream::copy_decode(compressed_data, &mut decompressed_data)
        .map_err(|e| TabframeError::ZstdError(e.to_string()))?;

    if decompressed_data.len() != uncompressed_len {
        return Err(TabframeError::ZstdError(format!(
            "Decompressed size does not match header. Expected {}, got {}.",
            uncompressed_len,
            decompressed_data.len()
        )));
    }

    Ok(decompressed_data)
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
