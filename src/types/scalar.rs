//! This module defines the canonical, type-safe representation of label values
//! used throughout the tabframe codecs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single label value: an integer or a string.
///
/// This is the value type for flat column labels, hierarchical tuple members,
/// and generic index entries. It is serialized untagged so labels appear in
/// mappings as native JSON values rather than enum wrappers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Str(String),
}

impl Scalar {
    /// Returns `true` if the scalar is textual.
    pub fn is_str(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    /// Returns the string content when the scalar is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// One column label as it appears in the canonical mapping: a flat scalar or
/// a fixed-arity tuple.
///
/// Untagged as well, so tuples serialize as JSON arrays and flat labels as
/// bare values. The array form is never flattened or stringified.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Label {
    Scalar(Scalar),
    Tuple(Vec<Scalar>),
}

/// Discriminates the two index families a frame can carry.
///
/// The tag travels in the binary schema header so decoding never has to
/// re-infer temporality from payload bytes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Generic,
    Temporal,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Temporal => write!(f, "temporal"),
        }
    }
}
