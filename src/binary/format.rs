// In: src/binary/format.rs

//! Defines the self-describing byte format for an encoded frame buffer.
//! This module is the single source of truth for serialization,
//! deserialization, and efficient metadata peeking of the buffer.
//!
//! Layout: magic (4) + format version (2, LE) + total rows (8, LE) +
//! header length (4, LE) + header bytes + payload streams. The header holds
//! the length-prefixed schema JSON followed by a table of (stream id,
//! payload length) entries; payloads follow in the same sorted-by-id order
//! the table declares.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};

use crate::error::TabframeError;
use crate::frame::ColumnLabels;
use crate::types::IndexKind;

//==================================================================================
// Format Constants
//==================================================================================

/// The magic signature opening every encoded frame buffer.
pub const FRAME_MAGIC: &[u8; 4] = b"TFRM";

/// Version of the buffer layout. Decoders accept exactly this version.
pub const FRAME_FORMAT_VERSION: u16 = 1;

/// The minimum possible size of a valid buffer in bytes.
const MIN_BUFFER_SIZE: usize = 18; // magic(4) + ver(2) + rows(8) + header_len(4)

/// A reasonable limit to prevent OOM attacks from malformed schema/id lengths. (16MB)
const MAX_REASONABLE_STRING_LEN: usize = 16 * 1024 * 1024;

//==================================================================================
// Public Structs
//==================================================================================

/// Structural metadata embedded in every buffer as a JSON header: the column
/// labels verbatim and the index family tag.
///
/// Values and index entries live in the payload streams; this header is what
/// makes the buffer self-describing without them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameSchema {
    pub columns: ColumnLabels,
    pub index_kind: IndexKind,
}

/// Metadata extracted from a buffer's header by [`FrameArtifact::peek_info`],
/// without reading the payload streams.
#[derive(Debug, PartialEq, Clone)]
pub struct HeaderInfo {
    /// The version of the buffer layout that was parsed.
    pub format_version: u16,
    pub total_rows: u64,
    /// The frame schema as a UTF-8 JSON string.
    pub schema_json: String,
    /// Metadata for each stream: (stream_id, compressed_size_in_bytes).
    /// The Vec is guaranteed to be sorted by stream_id.
    pub stream_metadata: Vec<(String, usize)>,
    /// The calculated size of the entire header section in bytes.
    pub header_size: usize,
    /// The calculated total size of all payload streams.
    pub data_size: usize,
}

/// A fully assembled buffer in memory: row count, schema, and the named
/// compressed payload streams. This struct is the target for full
/// deserialization and the source for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameArtifact {
    pub total_rows: u64,
    /// The frame schema as a UTF-8 JSON string.
    pub schema_json: String,
    pub streams: HashMap<String, Vec<u8>>,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl FrameArtifact {
    /// Serializes the artifact into its canonical byte form. Output is
    /// deterministic: stream keys are written in sorted order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TabframeError> {
        // Build the variable-length part of the header first.
        let mut header_buf = Vec::new();
        write_prefixed_string(&mut header_buf, &self.schema_json, 4)?;

        // Canonical stream order: the table and the payloads must agree
        // regardless of HashMap iteration order.
        let mut sorted_keys: Vec<_> = self.streams.keys().collect();
        sorted_keys.sort();

        header_buf.extend_from_slice(&(sorted_keys.len() as u16).to_le_bytes());
        for key in &sorted_keys {
            let data = &self.streams[*key];
            write_prefixed_string(&mut header_buf, key, 2)?;
            header_buf.extend_from_slice(&(data.len() as u64).to_le_bytes());
        }

        let final_size = MIN_BUFFER_SIZE
            + header_buf.len()
            + self.streams.values().map(|v| v.len()).sum::<usize>();
        let mut final_buf = Vec::with_capacity(final_size);

        final_buf.extend_from_slice(FRAME_MAGIC);
        final_buf.extend_from_slice(&FRAME_FORMAT_VERSION.to_le_bytes());
        final_buf.extend_from_slice(&self.total_rows.to_le_bytes());
        final_buf.extend_from_slice(&(header_buf.len() as u32).to_le_bytes());
        final_buf.extend_from_slice(&header_buf);

        // Payloads in the same sorted order as the table.
        for key in &sorted_keys {
            final_buf.extend_from_slice(&self.streams[*key]);
        }

        Ok(final_buf)
    }

    /// Deserializes a full byte slice, reading every payload stream into
    /// memory. All parse failures surface as `CorruptBuffer`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TabframeError> {
        // peek_info handles all header parsing and validation; this function
        // only has to read the payloads it described.
        let info = Self::peek_info(bytes)?;

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(info.header_size as u64);

        let map_err = |e: std::io::Error| TabframeError::CorruptBuffer(e.to_string());
        let mut streams = HashMap::with_capacity(info.stream_metadata.len());

        for (id, len) in info.stream_metadata {
            let mut data_buf = vec![0; len];
            cursor.read_exact(&mut data_buf).map_err(map_err)?;
            streams.insert(id, data_buf);
        }

        Ok(Self {
            total_rows: info.total_rows,
            schema_json: info.schema_json,
            streams,
        })
    }

    /// Peeks into a buffer's header to extract metadata without reading the
    /// (potentially large) payload streams.
    pub fn peek_info(bytes: &[u8]) -> Result<HeaderInfo, TabframeError> {
        if bytes.len() < MIN_BUFFER_SIZE {
            return Err(TabframeError::CorruptBuffer(format!(
                "Buffer is too small to be valid. Minimum size: {}, got: {}",
                MIN_BUFFER_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let map_err = |e: std::io::Error| TabframeError::CorruptBuffer(e.to_string());

        let mut magic_buf = [0u8; 4];
        cursor.read_exact(&mut magic_buf).map_err(map_err)?;
        if magic_buf != *FRAME_MAGIC {
            return Err(TabframeError::CorruptBuffer(
                "Invalid frame magic number".into(),
            ));
        }

        let mut u16_buf = [0u8; 2];
        cursor.read_exact(&mut u16_buf).map_err(map_err)?;
        let version = u16::from_le_bytes(u16_buf);
        if version != FRAME_FORMAT_VERSION {
            return Err(TabframeError::CorruptBuffer(format!(
                "Unsupported buffer version: expected {}, got {}",
                FRAME_FORMAT_VERSION, version
            )));
        }

        let mut u64_buf = [0u8; 8];
        cursor.read_exact(&mut u64_buf).map_err(map_err)?;
        let total_rows = u64::from_le_bytes(u64_buf);

        let mut u32_buf = [0u8; 4];
        cursor.read_exact(&mut u32_buf).map_err(map_err)?;
        let header_metadata_len = u32::from_le_bytes(u32_buf) as usize;
        let total_header_size = cursor.position() as usize + header_metadata_len;

        // The declared header length must fit inside the buffer.
        if bytes.len() < total_header_size {
            return Err(TabframeError::CorruptBuffer(
                "Header length exceeds buffer size".into(),
            ));
        }

        // Parse the variable-length header through a cursor scoped to it.
        let header_bytes = &bytes[cursor.position() as usize..total_header_size];
        let mut header_cursor = Cursor::new(header_bytes);

        let schema_json = read_prefixed_string(&mut header_cursor, 4)?;

        header_cursor.read_exact(&mut u16_buf).map_err(map_err)?;
        let stream_count = u16::from_le_bytes(u16_buf);
        let mut stream_metadata = Vec::with_capacity(stream_count as usize);
        let mut total_data_size: usize = 0;

        // The writer guarantees sorted stream order; trust it here.
        for _ in 0..stream_count {
            let id = read_prefixed_string(&mut header_cursor, 2)?;
            header_cursor.read_exact(&mut u64_buf).map_err(map_err)?;
            let len = u64::from_le_bytes(u64_buf) as usize;
            total_data_size = total_data_size.saturating_add(len);
            stream_metadata.push((id, len));
        }

        // The declared payload sizes must fit inside the buffer as well.
        if total_header_size.saturating_add(total_data_size) > bytes.len() {
            return Err(TabframeError::CorruptBuffer(
                "Sum of declared header and data sizes exceeds buffer length.".into(),
            ));
        }

        Ok(HeaderInfo {
            format_version: version,
            total_rows,
            schema_json,
            stream_metadata,
            header_size: total_header_size,
            data_size: total_data_size,
        })
    }
}

//==================================================================================
// Private Helpers
//==================================================================================

fn read_prefixed_string(
    cursor: &mut Cursor<&[u8]>,
    len_bytes: usize,
) -> Result<String, TabframeError> {
    let map_err = |e: std::io::Error| TabframeError::CorruptBuffer(e.to_string());

    let len = match len_bytes {
        2 => {
            let mut buf = [0u8; 2];
            cursor.read_exact(&mut buf).map_err(map_err)?;
            u16::from_le_bytes(buf) as usize
        }
        4 => {
            let mut buf = [0u8; 4];
            cursor.read_exact(&mut buf).map_err(map_err)?;
            u32::from_le_bytes(buf) as usize
        }
        _ => {
            return Err(TabframeError::InternalError(
                "Unsupported length prefix size".into(),
            ))
        }
    };

    // Validate length against a sane maximum before allocating.
    if len > MAX_REASONABLE_STRING_LEN {
        return Err(TabframeError::CorruptBuffer(format!(
            "String length ({}) exceeds maximum allowed size ({})",
            len, MAX_REASONABLE_STRING_LEN
        )));
    }

    let mut str_buf = vec![0; len];
    cursor.read_exact(&mut str_buf).map_err(map_err)?;
    String::from_utf8(str_buf).map_err(|e| TabframeError::CorruptBuffer(e.to_string()))
}

fn write_prefixed_string(
    buf: &mut Vec<u8>,
    s: &str,
    len_bytes: usize,
) -> Result<(), TabframeError> {
    let len = s.len();
    if len > MAX_REASONABLE_STRING_LEN {
        return Err(TabframeError::UnsupportedType(format!(
            "String length ({}) exceeds maximum allowed size ({})",
            len, MAX_REASONABLE_STRING_LEN
        )));
    }
    match len_bytes {
        2 => buf.extend_from_slice(&(len as u16).to_le_bytes()),
        4 => buf.extend_from_slice(&(len as u32).to_le_bytes()),
        _ => {
            return Err(TabframeError::InternalError(
                "Unsupported length prefix size".into(),
            ))
        }
    }
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

//==================================================================================
// Unit Tests
//==================================================================================
