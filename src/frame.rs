// In: src/frame.rs

//! The canonical in-memory tabular structure that every codec in this crate
//! converts to and from.
//!
//! A `Frame` owns three parts: ordered column labels (flat scalars or
//! fixed-arity tuples), an ordered row index (generic scalars or UTC
//! timestamps), and a dense row-major `f64` grid. All structural invariants
//! are enforced at construction, so a `Frame` in hand is always coherent and
//! the codecs never re-validate mid-flight.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::TabframeError;
use crate::types::{IndexKind, Label, Scalar};
use crate::utils::floats_close;

/// Relative tolerance for [`Frame::approx_eq`] that mirrors the precision the
/// codecs are required to preserve.
pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// Absolute floor under the relative comparison, for values near zero.
const DEFAULT_ABS_TOL: f64 = 1e-12;

//==================================================================================
// Column Labels
//==================================================================================

/// Ordered column labels: either all flat scalars or all tuples of one arity.
///
/// The two forms never mix within a frame. Serialized adjacently tagged so the
/// binary schema header states the form explicitly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", content = "labels", rename_all = "snake_case")]
pub enum ColumnLabels {
    Flat(Vec<Scalar>),
    Hierarchical(Vec<Vec<Scalar>>),
}

impl ColumnLabels {
    /// Builds flat labels. Always valid.
    pub fn flat(labels: Vec<Scalar>) -> Self {
        ColumnLabels::Flat(labels)
    }

    /// Builds hierarchical labels, enforcing one arity >= 1 across all tuples.
    pub fn hierarchical(tuples: Vec<Vec<Scalar>>) -> Result<Self, TabframeError> {
        let labels = ColumnLabels::Hierarchical(tuples);
        labels.validate()?;
        Ok(labels)
    }

    /// Rebuilds column structure from a canonical label list: all scalars make
    /// a flat set, all tuples a hierarchical set, mixtures are rejected.
    pub fn from_labels(labels: Vec<Label>) -> Result<Self, TabframeError> {
        let mut scalars = Vec::new();
        let mut tuples = Vec::new();
        for label in labels {
            match label {
                Label::Scalar(s) => scalars.push(s),
                Label::Tuple(t) => tuples.push(t),
            }
        }
        match (scalars.is_empty(), tuples.is_empty()) {
            (_, true) => Ok(ColumnLabels::Flat(scalars)),
            (true, false) => ColumnLabels::hierarchical(tuples),
            (false, false) => Err(TabframeError::MalformedPayload(
                "column labels mix flat scalars and tuples".to_string(),
            )),
        }
    }

    /// Projects every column label into its canonical form.
    pub fn to_labels(&self) -> Vec<Label> {
        match self {
            ColumnLabels::Flat(labels) => labels.iter().cloned().map(Label::Scalar).collect(),
            ColumnLabels::Hierarchical(tuples) => {
                tuples.iter().cloned().map(Label::Tuple).collect()
            }
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        match self {
            ColumnLabels::Flat(labels) => labels.len(),
            ColumnLabels::Hierarchical(tuples) => tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tuple arity for hierarchical labels, `None` for flat ones.
    pub fn arity(&self) -> Option<usize> {
        match self {
            ColumnLabels::Flat(_) => None,
            ColumnLabels::Hierarchical(tuples) => tuples.first().map(|t| t.len()),
        }
    }

    /// Checks the uniform-arity invariant. Used at construction and again on
    /// schema headers decoded from untrusted bytes.
    pub(crate) fn validate(&self) -> Result<(), TabframeError> {
        match self {
            ColumnLabels::Flat(_) => Ok(()),
            ColumnLabels::Hierarchical(tuples) => {
                let arity = match tuples.first() {
                    Some(first) => first.len(),
                    None => return Ok(()),
                };
                if arity == 0 {
                    return Err(TabframeError::MalformedPayload(
                        "hierarchical column labels require at least one level".to_string(),
                    ));
                }
                for tuple in tuples {
                    if tuple.len() != arity {
                        return Err(TabframeError::InconsistentArity(arity, tuple.len()));
                    }
                }
                Ok(())
            }
        }
    }
}

//==================================================================================
// Row Index
//==================================================================================

/// The ordered row index: arbitrary scalars or UTC timestamps at nanosecond
/// resolution.
///
/// Temporality is decided once, at construction, and carried explicitly from
/// then on. The sequence is ordered but not required to be unique or
/// monotonic, and nothing in this crate ever sorts or dedups it.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameIndex {
    Generic(Vec<Scalar>),
    Temporal(Vec<DateTime<Utc>>),
}

impl FrameIndex {
    /// The synthesized positional index `0..rows` used when a payload carries
    /// no index of its own.
    pub fn range(rows: usize) -> Self {
        FrameIndex::Generic((0..rows as i64).map(Scalar::Int).collect())
    }

    /// Number of index entries.
    pub fn len(&self) -> usize {
        match self {
            FrameIndex::Generic(entries) => entries.len(),
            FrameIndex::Temporal(instants) => instants.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The tag carried by the binary schema.
    pub fn kind(&self) -> IndexKind {
        match self {
            FrameIndex::Generic(_) => IndexKind::Generic,
            FrameIndex::Temporal(_) => IndexKind::Temporal,
        }
    }
}

//==================================================================================
// The Frame
//==================================================================================

/// A validated tabular dataset: labels, index, and a dense `f64` grid.
///
/// Immutable after construction; the codecs read it through accessors and
/// build new frames rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: ColumnLabels,
    index: FrameIndex,
    values: Array2<f64>,
}

impl Frame {
    /// Assembles a frame, enforcing every structural invariant: label arity,
    /// `nrows == index.len()`, `ncols == columns.len()`.
    pub fn new(
        columns: ColumnLabels,
        index: FrameIndex,
        values: Array2<f64>,
    ) -> Result<Self, TabframeError> {
        columns.validate()?;
        if values.nrows() != index.len() {
            return Err(TabframeError::ShapeMismatch(format!(
                "value grid has {} rows but the index has {} entries",
                values.nrows(),
                index.len()
            )));
        }
        if values.ncols() != columns.len() {
            return Err(TabframeError::ShapeMismatch(format!(
                "value grid has {} columns but {} column labels were given",
                values.ncols(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            index,
            values,
        })
    }

    /// An empty frame: no columns, no rows, generic index.
    pub fn empty() -> Self {
        Self {
            columns: ColumnLabels::Flat(Vec::new()),
            index: FrameIndex::Generic(Vec::new()),
            values: Array2::zeros((0, 0)),
        }
    }

    pub fn columns(&self) -> &ColumnLabels {
        &self.columns
    }

    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    /// The row-major value grid.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.values.ncols()
    }

    /// Structural equality with float tolerance: labels must match exactly,
    /// index entries value-for-value, grid cells within `rel_tol`.
    ///
    /// Empty column sets and empty indexes compare equal across their
    /// flat/hierarchical and generic/temporal tags, since a sequence with no
    /// entries loses its tag through the canonical mapping.
    pub fn approx_eq(&self, other: &Frame, rel_tol: f64) -> bool {
        let columns_match = match (&self.columns, &other.columns) {
            (ColumnLabels::Flat(a), ColumnLabels::Flat(b)) => a == b,
            (ColumnLabels::Hierarchical(a), ColumnLabels::Hierarchical(b)) => a == b,
            (a, b) => a.is_empty() && b.is_empty(),
        };
        if !columns_match {
            return false;
        }
        let indexes_match = match (&self.index, &other.index) {
            (FrameIndex::Generic(a), FrameIndex::Generic(b)) => a == b,
            (FrameIndex::Temporal(a), FrameIndex::Temporal(b)) => a == b,
            (a, b) => a.is_empty() && b.is_empty(),
        };
        if !indexes_match {
            return false;
        }
        if self.values.dim() != other.values.dim() {
            return false;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| floats_close(*a, *b, rel_tol, DEFAULT_ABS_TOL))
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_row_count_mismatch() {
        let result = Frame::new(
            ColumnLabels::flat(vec!["a".into(), "b".into()]),
            FrameIndex::range(3),
            array![[1.0, 2.0], [3.0, 4.0]],
        );
        assert!(matches!(result, Err(TabframeError::ShapeMismatch(_))));
    }

    #[test]
    fn test_new_rejects_column_count_mismatch() {
        let result = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::range(2),
            array![[1.0, 2.0], [3.0, 4.0]],
        );
        assert!(matches!(result, Err(TabframeError::ShapeMismatch(_))));
    }

    #[test]
    fn test_hierarchical_labels_enforce_uniform_arity() {
        let ragged = vec![
            vec!["a".into(), 1.into()],
            vec!["b".into(), 1.into(), 2.into()],
        ];
        let result = ColumnLabels::hierarchical(ragged);
        assert!(matches!(result, Err(TabframeError::InconsistentArity(2, 3))));

        let uniform = vec![vec!["a".into(), 1.into()], vec!["b".into(), 2.into()]];
        let labels = ColumnLabels::hierarchical(uniform).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.arity(), Some(2));
    }

    #[test]
    fn test_hierarchical_labels_reject_empty_tuples() {
        let result = ColumnLabels::hierarchical(vec![vec![], vec![]]);
        assert!(matches!(result, Err(TabframeError::MalformedPayload(_))));
    }

    #[test]
    fn test_from_labels_rejects_mixed_forms() {
        let mixed = vec![
            Label::Scalar("a".into()),
            Label::Tuple(vec!["b".into(), "c".into()]),
        ];
        let result = ColumnLabels::from_labels(mixed);
        assert!(matches!(result, Err(TabframeError::MalformedPayload(_))));
    }

    #[test]
    fn test_from_labels_roundtrips_both_forms() {
        let flat = ColumnLabels::flat(vec!["a".into(), 7.into()]);
        assert_eq!(ColumnLabels::from_labels(flat.to_labels()).unwrap(), flat);

        let hier =
            ColumnLabels::hierarchical(vec![vec!["a".into(), "x".into()], vec!["a".into(), "y".into()]])
                .unwrap();
        assert_eq!(ColumnLabels::from_labels(hier.to_labels()).unwrap(), hier);
    }

    #[test]
    fn test_range_index_is_positional() {
        let index = FrameIndex::range(3);
        assert_eq!(
            index,
            FrameIndex::Generic(vec![Scalar::Int(0), Scalar::Int(1), Scalar::Int(2)])
        );
        assert_eq!(index.kind(), IndexKind::Generic);
    }

    #[test]
    fn test_approx_eq_tolerates_tiny_differences_only() {
        let base = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::range(2),
            array![[1.0], [2.0]],
        )
        .unwrap();

        let close = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::range(2),
            array![[1.0 + 1e-12], [2.0]],
        )
        .unwrap();
        assert!(base.approx_eq(&close, DEFAULT_REL_TOL));

        let far = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::range(2),
            array![[1.001], [2.0]],
        )
        .unwrap();
        assert!(!base.approx_eq(&far, DEFAULT_REL_TOL));
    }

    #[test]
    fn test_approx_eq_requires_matching_index_values() {
        let a = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::Generic(vec![10.into()]),
            array![[1.0]],
        )
        .unwrap();
        let b = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::Generic(vec![11.into()]),
            array![[1.0]],
        )
        .unwrap();
        assert!(!a.approx_eq(&b, DEFAULT_REL_TOL));
    }

    #[test]
    fn test_empty_indexes_compare_equal_across_kinds() {
        let generic = Frame::empty();
        let temporal = Frame::new(
            ColumnLabels::Flat(Vec::new()),
            FrameIndex::Temporal(Vec::new()),
            Array2::zeros((0, 0)),
        )
        .unwrap();
        assert!(generic.approx_eq(&temporal, DEFAULT_REL_TOL));
    }

    #[test]
    fn test_empty_column_sets_compare_equal_across_forms() {
        let flat = Frame::empty();
        let hierarchical = Frame::new(
            ColumnLabels::hierarchical(Vec::new()).unwrap(),
            FrameIndex::Generic(Vec::new()),
            Array2::zeros((0, 0)),
        )
        .unwrap();
        assert!(flat.approx_eq(&hierarchical, DEFAULT_REL_TOL));
        assert!(hierarchical.approx_eq(&flat, DEFAULT_REL_TOL));

        let populated = Frame::new(
            ColumnLabels::flat(vec!["a".into()]),
            FrameIndex::range(1),
            array![[1.0]],
        )
        .unwrap();
        assert!(!populated.approx_eq(&hierarchical, DEFAULT_REL_TOL));
    }
}
