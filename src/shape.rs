// In: src/shape.rs

//! The column-shape normalizer for permissive mapping payloads.
//!
//! Incoming mappings arrive in one of four shapes, and which one they take
//! decides whether the resulting frame gets flat or hierarchical column
//! labels. This module owns the payload representation, the classifier that
//! maps raw JSON onto it, and the strict priority chain that decides the
//! shape. The decision is structural only: shapes are matched in a fixed
//! order and there is no scoring or fallback between them.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::TabframeError;
use crate::types::Scalar;

//==================================================================================
// 1. Payload Representation
//==================================================================================

/// A mapping payload in one of the four accepted shapes.
///
/// Entries are ordered pairs rather than a map: the payload's own ordering is
/// the column ordering of the frame it builds. Tuple keys cannot be expressed
/// in JSON, so `TupleKeyed` payloads only arise from in-process construction;
/// the other three shapes also arrive via [`RawPayload::from_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// `{label: [values...]}`: one flat column per entry.
    FlatMapping(Vec<(Scalar, Vec<f64>)>),
    /// `{outer: {inner: [values...]}}`: two-level hierarchical columns.
    NestedMapping(Vec<(Scalar, Vec<(Scalar, Vec<f64>)>)>),
    /// `{(level0, level1, ...): [values...]}`: explicit tuple labels.
    TupleKeyed(Vec<(Vec<Scalar>, Vec<f64>)>),
    /// `[[row...], ...]`: rows of values, labels and index synthesized.
    Positional(Vec<Vec<f64>>),
}

impl RawPayload {
    /// Classifies a JSON value into one of the accepted payload shapes.
    ///
    /// An object with any object value must be nested throughout; an object
    /// with only array values is a flat mapping; a top-level array is
    /// positional rows. Every cell must be numeric. Anything else is rejected
    /// as malformed. Object key order is preserved as seen in the document.
    pub fn from_json(value: &Value) -> Result<Self, TabframeError> {
        match value {
            Value::Object(map) => {
                if map.values().any(|v| v.is_object()) {
                    let mut groups = Vec::with_capacity(map.len());
                    for (outer, inner) in map {
                        let inner_map = inner.as_object().ok_or_else(|| {
                            TabframeError::MalformedPayload(format!(
                                "nested payload mixes groups and plain values at key '{}'",
                                outer
                            ))
                        })?;
                        let mut columns = Vec::with_capacity(inner_map.len());
                        for (inner_key, cells) in inner_map {
                            columns.push((Scalar::from(inner_key.as_str()), json_column(inner_key, cells)?));
                        }
                        groups.push((Scalar::from(outer.as_str()), columns));
                    }
                    Ok(RawPayload::NestedMapping(groups))
                } else {
                    let mut columns = Vec::with_capacity(map.len());
                    for (label, cells) in map {
                        columns.push((Scalar::from(label.as_str()), json_column(label, cells)?));
                    }
                    Ok(RawPayload::FlatMapping(columns))
                }
            }
            Value::Array(rows) => {
                let mut grid = Vec::with_capacity(rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let cells = row.as_array().ok_or_else(|| {
                        TabframeError::MalformedPayload(format!(
                            "positional payload row {} is not a sequence",
                            i
                        ))
                    })?;
                    let mut parsed = Vec::with_capacity(cells.len());
                    for cell in cells {
                        parsed.push(json_cell(cell)?);
                    }
                    grid.push(parsed);
                }
                Ok(RawPayload::Positional(grid))
            }
            _ => Err(TabframeError::MalformedPayload(
                "payload must be a mapping or a sequence of rows".to_string(),
            )),
        }
    }
}

/// Parses one column's cell list, requiring every cell to be numeric.
fn json_column(label: &str, cells: &Value) -> Result<Vec<f64>, TabframeError> {
    let list = cells.as_array().ok_or_else(|| {
        TabframeError::MalformedPayload(format!("column '{}' is not a sequence of values", label))
    })?;
    let mut parsed = Vec::with_capacity(list.len());
    for cell in list {
        parsed.push(json_cell(cell)?);
    }
    Ok(parsed)
}

fn json_cell(cell: &Value) -> Result<f64, TabframeError> {
    cell.as_f64().ok_or_else(|| {
        TabframeError::MalformedPayload(format!("cell {} is not numeric", cell))
    })
}

//==================================================================================
// 2. Shape Decision
//==================================================================================

/// The column structure a payload resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    Flat,
    Hierarchical { arity: usize },
}

/// Decides the column shape for a payload via the strict priority chain:
/// tuple keys, then nested groups, then flat mapping, then positional rows.
///
/// Tuple keys fix the arity and must agree exactly. Nested groups always
/// resolve to arity 2 and every group must carry the same inner keys,
/// compared as sets. The flat shapes carry no structure to validate here.
pub fn decide(payload: &RawPayload) -> Result<ColumnShape, TabframeError> {
    match payload {
        RawPayload::TupleKeyed(entries) => {
            let arity = match entries.first() {
                Some((first_key, _)) => first_key.len(),
                None => {
                    return Err(TabframeError::MalformedPayload(
                        "tuple-keyed payload with no entries has no arity".to_string(),
                    ))
                }
            };
            if arity == 0 {
                return Err(TabframeError::MalformedPayload(
                    "tuple keys must have at least one level".to_string(),
                ));
            }
            for (key, _) in entries {
                if key.len() != arity {
                    return Err(TabframeError::InconsistentArity(arity, key.len()));
                }
            }
            Ok(ColumnShape::Hierarchical { arity })
        }
        RawPayload::NestedMapping(groups) => {
            if let Some((first_outer, first_group)) = groups.first() {
                let reference: HashSet<&Scalar> = first_group.iter().map(|(k, _)| k).collect();
                for (outer, group) in groups.iter().skip(1) {
                    let keys: HashSet<&Scalar> = group.iter().map(|(k, _)| k).collect();
                    if keys != reference || group.len() != first_group.len() {
                        return Err(TabframeError::MalformedPayload(format!(
                            "nested group '{}' does not share the inner keys of '{}'",
                            outer, first_outer
                        )));
                    }
                }
            }
            Ok(ColumnShape::Hierarchical { arity: 2 })
        }
        RawPayload::FlatMapping(_) => Ok(ColumnShape::Flat),
        RawPayload::Positional(_) => Ok(ColumnShape::Flat),
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
