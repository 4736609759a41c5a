// In: src/binary/mod.rs

//! The binary columnar codec: `Frame` to self-describing compressed buffer
//! and back.
//!
//! The byte layout lives in [`format`]; this module owns schema and stream
//! packing on the way out, and the strict validation on the way in. Decoding
//! never produces a structurally wrong frame: every failure mode, from a bad
//! magic number to a payload that decompresses to the wrong cell count,
//! surfaces as `CorruptBuffer`.

pub mod format;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use chrono::DateTime;
use log::debug;
use ndarray::Array2;

use crate::config::CodecConfig;
use crate::error::TabframeError;
use crate::frame::{Frame, FrameIndex};
use crate::kernels::zstd;
use crate::types::{IndexKind, Scalar};
use crate::utils::{bytes_to_typed_vec, typed_slice_to_bytes};
use format::{FrameArtifact, FrameSchema};

/// Stream ids inside the buffer. Sorted id order is part of the layout.
const INDEX_STREAM: &str = "index";
const VALUES_STREAM: &str = "values";

//==================================================================================
// 1. Public API
//==================================================================================

/// Encodes a frame into its binary buffer form with the default
/// configuration.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, TabframeError> {
    encode_frame_with(frame, &CodecConfig::default())
}

/// Encodes a frame into its binary buffer form.
///
/// The buffer is self-describing and deterministic: the same frame and
/// configuration always produce identical bytes. Cell values are carried
/// bit-exact; timestamps are carried as epoch nanoseconds, and instants
/// outside that range are rejected as `UnsupportedType`.
pub fn encode_frame_with(frame: &Frame, config: &CodecConfig) -> Result<Vec<u8>, TabframeError> {
    let level = config.profile.zstd_level();

    let schema = FrameSchema {
        columns: frame.columns().clone(),
        index_kind: frame.index().kind(),
    };
    let schema_json = serde_json::to_string(&schema)?;

    let index_bytes = match frame.index() {
        FrameIndex::Temporal(instants) => {
            let mut nanos = Vec::with_capacity(instants.len());
            for instant in instants {
                let ns = instant.timestamp_nanos_opt().ok_or_else(|| {
                    TabframeError::UnsupportedType(format!(
                        "timestamp {} is outside the encodable nanosecond range",
                        instant
                    ))
                })?;
                nanos.push(ns);
            }
            typed_slice_to_bytes(&nanos)
        }
        FrameIndex::Generic(entries) => serde_json::to_vec(entries)?,
    };
    let values_bytes = values_to_bytes(frame);

    let mut streams = HashMap::with_capacity(2);
    streams.insert(INDEX_STREAM.to_string(), zstd::encode(&index_bytes, level)?);
    streams.insert(
        VALUES_STREAM.to_string(),
        zstd::encode(&values_bytes, level)?,
    );

    let artifact = FrameArtifact {
        total_rows: frame.num_rows() as u64,
        schema_json,
        streams,
    };
    let bytes = artifact.to_bytes()?;
    debug!(
        "encoded frame: {} rows x {} columns -> {} bytes",
        frame.num_rows(),
        frame.num_columns(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decodes a binary buffer back into a frame.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, TabframeError> {
    let mut artifact = FrameArtifact::from_bytes(bytes)?;

    let schema: FrameSchema = serde_json::from_str(&artifact.schema_json)
        .map_err(|e| TabframeError::CorruptBuffer(format!("schema header does not parse: {}", e)))?;
    schema
        .columns
        .validate()
        .map_err(|e| TabframeError::CorruptBuffer(format!("schema header is invalid: {}", e)))?;

    let rows = usize::try_from(artifact.total_rows).map_err(|_| {
        TabframeError::CorruptBuffer("declared row count exceeds addressable memory".to_string())
    })?;
    let cols = schema.columns.len();

    let index_compressed = artifact.streams.remove(INDEX_STREAM).ok_or_else(|| {
        TabframeError::CorruptBuffer(format!("missing '{}' stream", INDEX_STREAM))
    })?;
    let values_compressed = artifact.streams.remove(VALUES_STREAM).ok_or_else(|| {
        TabframeError::CorruptBuffer(format!("missing '{}' stream", VALUES_STREAM))
    })?;

    let index_bytes = zstd::decode(&index_compressed)
        .map_err(|e| TabframeError::CorruptBuffer(format!("index stream: {}", e)))?;
    let values_bytes = zstd::decode(&values_compressed)
        .map_err(|e| TabframeError::CorruptBuffer(format!("values stream: {}", e)))?;

    let index = decode_index(schema.index_kind, &index_bytes, rows)?;

    let expected_cells = rows.checked_mul(cols).ok_or_else(|| {
        TabframeError::CorruptBuffer("declared grid size overflows".to_string())
    })?;
    let cells: Vec<f64> = bytes_to_typed_vec(&values_bytes)
        .map_err(|e| TabframeError::CorruptBuffer(format!("values stream: {}", e)))?;
    if cells.len() != expected_cells {
        return Err(TabframeError::CorruptBuffer(format!(
            "values stream holds {} cells where {} were expected",
            cells.len(),
            expected_cells
        )));
    }
    let values = Array2::from_shape_vec((rows, cols), cells)
        .map_err(|e| TabframeError::CorruptBuffer(e.to_string()))?;

    let frame = Frame::new(schema.columns, index, values)
        .map_err(|e| TabframeError::CorruptBuffer(e.to_string()))?;
    debug!("decoded frame: {} rows x {} columns", rows, cols);
    Ok(frame)
}

/// A cheap structural summary of an encoded buffer, parsed from the header
/// without decompressing any payload.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSummary {
    pub total_rows: u64,
    pub num_columns: usize,
    pub index_kind: IndexKind,
    pub header_size: usize,
    pub data_size: usize,
    pub total_size: usize,
}

/// Inspects a buffer's header. Fails with `CorruptBuffer` exactly where
/// [`decode_frame`] would fail on the same header.
pub fn inspect(bytes: &[u8]) -> Result<BufferSummary, TabframeError> {
    let info = FrameArtifact::peek_info(bytes)?;
    let schema: FrameSchema = serde_json::from_str(&info.schema_json)
        .map_err(|e| TabframeError::CorruptBuffer(format!("schema header does not parse: {}", e)))?;
    schema
        .columns
        .validate()
        .map_err(|e| TabframeError::CorruptBuffer(format!("schema header is invalid: {}", e)))?;

    Ok(BufferSummary {
        total_rows: info.total_rows,
        num_columns: schema.columns.len(),
        index_kind: schema.index_kind,
        header_size: info.header_size,
        data_size: info.data_size,
        total_size: bytes.len(),
    })
}

//==================================================================================
// 2. Stream Packing Helpers
//==================================================================================

fn values_to_bytes(frame: &Frame) -> Vec<u8> {
    let values = frame.values();
    match values.as_slice() {
        Some(flat) => typed_slice_to_bytes(flat),
        // Fallback for non-contiguous layouts; iteration is row-major.
        None => typed_slice_to_bytes(&values.iter().copied().collect::<Vec<f64>>()),
    }
}

fn decode_index(
    kind: IndexKind,
    index_bytes: &[u8],
    rows: usize,
) -> Result<FrameIndex, TabframeError> {
    match kind {
        IndexKind::Temporal => {
            let nanos: Vec<i64> = bytes_to_typed_vec(index_bytes)
                .map_err(|e| TabframeError::CorruptBuffer(format!("index stream: {}", e)))?;
            if nanos.len() != rows {
                return Err(TabframeError::CorruptBuffer(format!(
                    "index stream holds {} entries for {} rows",
                    nanos.len(),
                    rows
                )));
            }
            Ok(FrameIndex::Temporal(
                nanos
                    .into_iter()
                    .map(DateTime::from_timestamp_nanos)
                    .collect(),
            ))
        }
        IndexKind::Generic => {
            let entries: Vec<Scalar> = serde_json::from_slice(index_bytes).map_err(|e| {
                TabframeError::CorruptBuffer(format!("index stream does not parse: {}", e))
            })?;
            if entries.len() != rows {
                return Err(TabframeError::CorruptBuffer(format!(
                    "index stream holds {} entries for {} rows",
                    entries.len(),
                    rows
                )));
            }
            Ok(FrameIndex::Generic(entries))
        }
    }
}
