// In: src/binary/tests.rs

//! Roundtrip and rejection tests for the binary columnar codec. Every
//! rejection case asserts `CorruptBuffer`, because decoding must never
//! panic or return half a frame no matter what bytes come in.

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use ndarray::{array, Array2, ShapeBuilder};

use crate::binary::format::{FrameArtifact, FrameSchema};
use crate::binary::{decode_frame, encode_frame, encode_frame_with, inspect};
use crate::config::{CodecConfig, CompressionProfile};
use crate::error::TabframeError;
use crate::frame::{ColumnLabels, Frame, FrameIndex};
use crate::types::{IndexKind, Scalar};

//==================================================================================
// Test Helpers
//==================================================================================

fn random_grid(rows: usize, cols: usize) -> Array2<f64> {
    let cells: Vec<f64> = (0..rows * cols).map(|_| rand::random()).collect();
    Array2::from_shape_vec((rows, cols), cells).unwrap()
}

fn int_labels(cols: usize) -> ColumnLabels {
    ColumnLabels::flat((0..cols as i64).map(Scalar::Int).collect())
}

fn three_hourly_index(rows: usize) -> FrameIndex {
    let start = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
    FrameIndex::Temporal(
        (0..rows as i64)
            .map(|i| start + Duration::hours(3 * i))
            .collect(),
    )
}

//==================================================================================
// Roundtrips
//==================================================================================

#[test]
fn test_roundtrip_flat_labels_generic_index() {
    let frame = Frame::new(int_labels(10), FrameIndex::range(10), random_grid(10, 10)).unwrap();

    let bytes = encode_frame(&frame).unwrap();
    let decoded = decode_frame(&bytes).unwrap();

    assert_eq!(decoded, frame);
    assert_eq!(decoded.index().kind(), IndexKind::Generic);
}

#[test]
fn test_roundtrip_temporal_index() {
    let frame = Frame::new(int_labels(10), three_hourly_index(10), random_grid(10, 10)).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded, frame);
    assert_eq!(decoded.index().kind(), IndexKind::Temporal);
}

#[test]
fn test_roundtrip_hierarchical_labels() {
    let mut tuples = Vec::new();
    for outer in ["col1", "col2"] {
        for inner in ["ft1", "ft2"] {
            tuples.push(vec![outer.into(), inner.into()]);
        }
    }
    let columns = ColumnLabels::hierarchical(tuples).unwrap();
    let frame = Frame::new(columns, three_hourly_index(10), random_grid(10, 4)).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded, frame);
    assert_eq!(decoded.columns().arity(), Some(2));
}

#[test]
fn test_roundtrip_hierarchical_labels_generic_index() {
    let columns = ColumnLabels::hierarchical(vec![
        vec!["gauge".into(), 0.into()],
        vec!["gauge".into(), 1.into()],
    ])
    .unwrap();
    let index = FrameIndex::Generic(vec!["a".into(), "b".into(), "c".into()]);
    let frame = Frame::new(columns, index, random_grid(3, 2)).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded, frame);
}

#[test]
fn test_roundtrip_string_index_and_labels() {
    let columns = ColumnLabels::flat(vec!["speed".into(), "pressure".into()]);
    let index = FrameIndex::Generic(vec!["r0".into(), "r1".into(), "r2".into()]);
    let frame = Frame::new(columns, index, array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded, frame);
}

#[test]
fn test_roundtrip_empty_frame() {
    let frame = Frame::empty();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded, frame);
    assert_eq!(decoded.num_rows(), 0);
    assert_eq!(decoded.num_columns(), 0);
}

#[test]
fn test_roundtrip_preserves_exact_cell_bits() {
    let values = array![
        [f64::INFINITY, f64::NEG_INFINITY, f64::MAX],
        [f64::MIN_POSITIVE, -0.0, f64::NAN],
    ];
    let frame = Frame::new(int_labels(3), FrameIndex::range(2), values).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    for (original, restored) in frame.values().iter().zip(decoded.values().iter()) {
        assert_eq!(original.to_bits(), restored.to_bits());
    }
}

#[test]
fn test_roundtrip_non_contiguous_grid() {
    // Column-major storage; logical rows are [1,2,3] and [4,5,6].
    let values =
        Array2::from_shape_vec((2, 3).f(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]).unwrap();
    assert!(values.as_slice().is_none());
    let frame = Frame::new(int_labels(3), FrameIndex::range(2), values).unwrap();

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();

    assert_eq!(decoded.values(), &array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
}

#[test]
fn test_encode_is_deterministic() {
    let values = Array2::from_shape_fn((6, 4), |(r, c)| (r * 4 + c) as f64);
    let frame = Frame::new(int_labels(4), three_hourly_index(6), values).unwrap();

    let first = encode_frame(&frame).unwrap();
    let second = encode_frame(&frame).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_profiles_decode_identically() {
    let values = Array2::from_shape_fn((50, 3), |(r, _)| r as f64);
    let frame = Frame::new(int_labels(3), FrameIndex::range(50), values).unwrap();

    for profile in [
        CompressionProfile::Fast,
        CompressionProfile::Balanced,
        CompressionProfile::HighCompression,
    ] {
        let bytes = encode_frame_with(&frame, &CodecConfig { profile }).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap(), frame);
    }
}

//==================================================================================
// Header Inspection
//==================================================================================

#[test]
fn test_inspect_matches_encoded_layout() {
    let frame = Frame::new(int_labels(3), three_hourly_index(8), random_grid(8, 3)).unwrap();
    let bytes = encode_frame(&frame).unwrap();

    let summary = inspect(&bytes).unwrap();

    assert_eq!(summary.total_rows, 8);
    assert_eq!(summary.num_columns, 3);
    assert_eq!(summary.index_kind, IndexKind::Temporal);
    assert_eq!(summary.total_size, bytes.len());
    assert_eq!(summary.header_size + summary.data_size, bytes.len());
}

//==================================================================================
// Malformed Buffers
//==================================================================================

#[test]
fn test_decode_rejects_garbage_and_short_input() {
    assert!(matches!(
        decode_frame(&[]),
        Err(TabframeError::CorruptBuffer(_))
    ));
    assert!(matches!(
        decode_frame(b"TFRM"),
        Err(TabframeError::CorruptBuffer(_))
    ));
    assert!(matches!(
        decode_frame(&[0xAB; 64]),
        Err(TabframeError::CorruptBuffer(_))
    ));
}

#[test]
fn test_decode_rejects_truncated_buffer() {
    let frame = Frame::new(int_labels(2), FrameIndex::range(4), random_grid(4, 2)).unwrap();
    let bytes = encode_frame(&frame).unwrap();

    let result = decode_frame(&bytes[..bytes.len() - 1]);

    assert!(matches!(result, Err(TabframeError::CorruptBuffer(_))));
}

#[test]
fn test_decode_rejects_bad_magic() {
    let frame = Frame::new(int_labels(2), FrameIndex::range(2), random_grid(2, 2)).unwrap();
    let mut bytes = encode_frame(&frame).unwrap();
    bytes[0] = b'X';

    assert!(matches!(
        decode_frame(&bytes),
        Err(TabframeError::CorruptBuffer(_))
    ));
    assert!(matches!(
        inspect(&bytes),
        Err(TabframeError::CorruptBuffer(_))
    ));
}

#[test]
fn test_decode_rejects_unknown_version() {
    let frame = Frame::new(int_labels(2), FrameIndex::range(2), random_grid(2, 2)).unwrap();
    let mut bytes = encode_frame(&frame).unwrap();
    bytes[4] = 0xFF;
    bytes[5] = 0xFF;

    assert!(matches!(
        decode_frame(&bytes),
        Err(TabframeError::CorruptBuffer(_))
    ));
}

#[test]
fn test_decode_rejects_corrupted_schema() {
    let frame = Frame::new(int_labels(2), FrameIndex::range(2), random_grid(2, 2)).unwrap();
    let mut bytes = encode_frame(&frame).unwrap();
    // The schema JSON starts right after its 4-byte length prefix at offset 18.
    bytes[23] = b'}';

    assert!(matches!(
        decode_frame(&bytes),
        Err(TabframeError::CorruptBuffer(_))
    ));
}

#[test]
fn test_decode_rejects_missing_stream() {
    let schema = FrameSchema {
        columns: ColumnLabels::flat(Vec::new()),
        index_kind: IndexKind::Generic,
    };
    let artifact = FrameArtifact {
        total_rows: 0,
        schema_json: serde_json::to_string(&schema).unwrap(),
        streams: HashMap::new(),
    };
    let bytes = artifact.to_bytes().unwrap();

    let result = decode_frame(&bytes);

    assert!(matches!(result, Err(TabframeError::CorruptBuffer(_))));
}

#[test]
fn test_encode_rejects_out_of_range_timestamp() {
    // Nanosecond timestamps only cover years 1677 through 2262.
    let far_future = Utc.with_ymd_and_hms(2500, 1, 1, 0, 0, 0).unwrap();
    let frame = Frame::new(
        int_labels(1),
        FrameIndex::Temporal(vec![far_future]),
        array![[1.0]],
    )
    .unwrap();

    let result = encode_frame(&frame);

    assert!(matches!(result, Err(TabframeError::UnsupportedType(_))));
}
