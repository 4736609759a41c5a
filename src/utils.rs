// In: src/utils.rs

//! Shared byte-level and numeric helpers for the codec modules.
//!
//! All payload casts go through `bytemuck` so every reinterpretation is
//! checked. Multi-byte values are Little-Endian throughout the format.

use bytemuck::Pod;
use num_traits::Float;

use crate::error::TabframeError;

/// Converts a slice of Pod values into owned bytes. This involves a copy.
pub fn typed_slice_to_bytes<T: Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

/// Copies a byte buffer into an owned, correctly aligned vector of Pod values.
///
/// Decompressed payload buffers carry no alignment guarantee, so this returns
/// an owned vector instead of a zero-copy slice view.
pub fn bytes_to_typed_vec<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, TabframeError> {
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 {
        return Err(TabframeError::BufferMismatch(size, bytes.len()));
    }
    Ok(bytemuck::pod_collect_to_vec(bytes))
}

/// Numpy-style closeness test: exact match (covers infinities and signed
/// zeros) or `|a - b| <= atol + rtol * |b|`.
pub fn floats_close<T: Float>(a: T, b: T, rtol: T, atol: T) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= atol + rtol * b.abs()
}
