// In: src/mapping/mod.rs

//! The mapping codec: `Frame` to the canonical nested mapping and back, plus
//! the permissive ingestion path for loosely shaped payloads.
//!
//! Two directions with different contracts:
//!
//!   1. Canonicalizing: `to_mapping` emits the one fixed `{index, columns,
//!      data}` projection, and `from_canonical_mapping` is its dedicated
//!      inverse. No inference happens on this path.
//!
//!   2. Permissive: `from_mapping` accepts any of the four payload shapes,
//!      runs the column-shape decision from [`crate::shape`], synthesizes
//!      whatever labels and index the payload lacks, and builds a frame.
//!      Inputs are borrowed and never mutated.
//!
//! Temporal index entries cross the mapping boundary as RFC3339 strings; the
//! canonical inverse restores the temporal tag exactly when every index entry
//! parses back as one.


use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TabframeError;
use crate::frame::{ColumnLabels, Frame, FrameIndex};
use crate::shape::{self, RawPayload};
use crate::types::{Label, Scalar};

//==================================================================================
// 1. The Canonical Mapping
//==================================================================================

/// The canonical nested-mapping projection of a frame.
///
/// The field names are the wire contract: this struct serializes to exactly
/// `{"index": [...], "columns": [...], "data": [[...]]}`, with hierarchical
/// column labels as arrays and data rows in index order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CanonicalMapping {
    pub index: Vec<Scalar>,
    pub columns: Vec<Label>,
    pub data: Vec<Vec<f64>>,
}

//==================================================================================
// 2. Canonicalizing Direction
//==================================================================================

/// Projects a frame into its canonical mapping form. Pure and infallible.
///
/// Generic index entries pass through unchanged; temporal entries become
/// RFC3339 strings in UTC with a `Z` suffix, keeping sub-second digits.
pub fn to_mapping(frame: &Frame) -> CanonicalMapping {
    let index = match frame.index() {
        FrameIndex::Generic(entries) => entries.clone(),
        FrameIndex::Temporal(instants) => instants
            .iter()
            .map(|dt| Scalar::Str(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .collect(),
    };
    let data = frame
        .values()
        .rows()
        .into_iter()
        .map(|row| row.iter().copied().collect())
        .collect();

    CanonicalMapping {
        index,
        columns: frame.columns().to_labels(),
        data,
    }
}

/// Rebuilds a frame from its canonical mapping form. The dedicated inverse of
/// [`to_mapping`]: no shape inference, only structural validation.
///
/// A non-empty index whose entries are all RFC3339 strings comes back
/// temporal; any other index stays generic.
pub fn from_canonical_mapping(mapping: &CanonicalMapping) -> Result<Frame, TabframeError> {
    let columns = ColumnLabels::from_labels(mapping.columns.clone())?;
    let rows = mapping.index.len();
    let cols = columns.len();

    if mapping.data.len() != rows {
        return Err(TabframeError::MalformedPayload(format!(
            "data has {} rows but the index has {} entries",
            mapping.data.len(),
            rows
        )));
    }
    let mut cells = Vec::with_capacity(rows * cols);
    for (i, row) in mapping.data.iter().enumerate() {
        if row.len() != cols {
            return Err(TabframeError::MalformedPayload(format!(
                "data row {} has {} values where {} columns were declared",
                i,
                row.len(),
                cols
            )));
        }
        cells.extend_from_slice(row);
    }
    let values = Array2::from_shape_vec((rows, cols), cells)
        .map_err(|e| TabframeError::InternalError(e.to_string()))?;

    Frame::new(columns, index_from_scalars(&mapping.index), values)
}

fn index_from_scalars(entries: &[Scalar]) -> FrameIndex {
    // A temporal restore needs every entry textual; an empty index stays
    // generic.
    if entries.is_empty() || !entries.iter().all(Scalar::is_str) {
        return FrameIndex::Generic(entries.to_vec());
    }
    let mut instants = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.as_str().map(DateTime::parse_from_rfc3339) {
            Some(Ok(dt)) => instants.push(dt.with_timezone(&Utc)),
            _ => return FrameIndex::Generic(entries.to_vec()),
        }
    }
    FrameIndex::Temporal(instants)
}

//==================================================================================
// 3. Permissive Direction
//==================================================================================

/// Builds a frame from a loosely shaped payload.
///
/// The column shape comes from the strict decision chain in [`crate::shape`].
/// Mapping shapes get the synthesized positional index `0..rows`; positional
/// payloads are row-major and also get synthesized integer column labels.
/// Column order follows payload order; nested columns are emitted outer group
/// by outer group, each in its own inner order.
pub fn from_mapping(payload: &RawPayload) -> Result<Frame, TabframeError> {
    let shape = shape::decide(payload)?;
    debug!("payload resolved to column shape {:?}", shape);

    match payload {
        RawPayload::FlatMapping(columns) => {
            let labels = ColumnLabels::flat(columns.iter().map(|(k, _)| k.clone()).collect());
            let values = grid_from_columns(columns.iter().map(|(_, cells)| cells.as_slice()))?;
            Frame::new(labels, FrameIndex::range(values.nrows()), values)
        }
        RawPayload::NestedMapping(groups) => {
            let mut tuples = Vec::new();
            let mut cell_columns = Vec::new();
            for (outer, group) in groups {
                for (inner, cells) in group {
                    tuples.push(vec![outer.clone(), inner.clone()]);
                    cell_columns.push(cells.as_slice());
                }
            }
            let labels = ColumnLabels::hierarchical(tuples)?;
            let values = grid_from_columns(cell_columns.into_iter())?;
            Frame::new(labels, FrameIndex::range(values.nrows()), values)
        }
        RawPayload::TupleKeyed(entries) => {
            let labels =
                ColumnLabels::hierarchical(entries.iter().map(|(k, _)| k.clone()).collect())?;
            let values = grid_from_columns(entries.iter().map(|(_, cells)| cells.as_slice()))?;
            Frame::new(labels, FrameIndex::range(values.nrows()), values)
        }
        RawPayload::Positional(rows) => {
            let values = grid_from_rows(rows)?;
            let labels = ColumnLabels::flat((0..values.ncols() as i64).map(Scalar::Int).collect());
            Frame::new(labels, FrameIndex::range(values.nrows()), values)
        }
    }
}

/// Classifies a JSON document and builds a frame from it in one step.
pub fn from_mapping_json(value: &Value) -> Result<Frame, TabframeError> {
    let payload = RawPayload::from_json(value)?;
    from_mapping(&payload)
}

//==================================================================================
// 4. Grid Assembly Helpers
//==================================================================================

/// Assembles a row-major grid from column-major cell lists, requiring every
/// column to carry the same number of values.
fn grid_from_columns<'a>(
    columns: impl Iterator<Item = &'a [f64]>,
) -> Result<Array2<f64>, TabframeError> {
    let columns: Vec<&[f64]> = columns.collect();
    let rows = columns.first().map(|c| c.len()).unwrap_or(0);
    for (i, cells) in columns.iter().enumerate() {
        if cells.len() != rows {
            return Err(TabframeError::MalformedPayload(format!(
                "column {} has {} values where {} were expected",
                i,
                cells.len(),
                rows
            )));
        }
    }

    let cols = columns.len();
    let mut flat = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for cells in &columns {
            flat.push(cells[r]);
        }
    }
    Array2::from_shape_vec((rows, cols), flat)
        .map_err(|e| TabframeError::InternalError(e.to_string()))
}

/// Assembles a grid from row-major rows, requiring uniform row width.
fn grid_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>, TabframeError> {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(TabframeError::MalformedPayload(format!(
                "row {} has {} values where {} were expected",
                i,
                row.len(),
                cols
            )));
        }
    }

    let mut flat = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), cols), flat)
        .map_err(|e| TabframeError::InternalError(e.to_string()))
}
