// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The mapper contract: how a field is typed and what it can be queried with.

use std::fmt;

use geo::Geometry;

use super::geo_point::GeoPointMapper;
use super::temporal::{BitemporalMapper, DateRangeMapper};
use crate::analysis::Analyzer;
use crate::error::{ConditionError, Result};
use crate::spatial::SpatialStrategy;
use crate::value::{Row, Value};

/// Canonical value type of a single-column mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Text,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Text => write!(f, "text"),
            BaseType::Int32 => write!(f, "int32"),
            BaseType::Int64 => write!(f, "int64"),
            BaseType::Float32 => write!(f, "float32"),
            BaseType::Float64 => write!(f, "float64"),
        }
    }
}

/// A value converted to a mapper's base type.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseValue {
    Text(String),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl BaseValue {
    pub fn base_type(&self) -> BaseType {
        match self {
            BaseValue::Text(_) => BaseType::Text,
            BaseValue::Int32(_) => BaseType::Int32,
            BaseValue::Int64(_) => BaseType::Int64,
            BaseValue::Float32(_) => BaseType::Float32,
            BaseValue::Float64(_) => BaseType::Float64,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            BaseValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_i32(self) -> Option<i32> {
        match self {
            BaseValue::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_i64(self) -> Option<i64> {
        match self {
            BaseValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_f32(self) -> Option<f32> {
        match self {
            BaseValue::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_f64(self) -> Option<f64> {
        match self {
            BaseValue::Float64(v) => Some(v),
            _ => None,
        }
    }
}

/// A value as stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Terms in position order
    Terms(Vec<String>),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Shape(Geometry<f64>),
}

impl From<BaseValue> for FieldValue {
    fn from(value: BaseValue) -> Self {
        match value {
            BaseValue::Text(v) => FieldValue::Terms(vec![v]),
            BaseValue::Int32(v) => FieldValue::Int32(v),
            BaseValue::Int64(v) => FieldValue::Int64(v),
            BaseValue::Float32(v) => FieldValue::Float32(v),
            BaseValue::Float64(v) => FieldValue::Float64(v),
        }
    }
}

/// One field value produced by indexing a row.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedField {
    pub name: String,
    pub value: FieldValue,
}

impl IndexedField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Schema-side descriptor of one indexed field.
///
/// Capabilities are advertised through the `Option`-returning accessors;
/// conditions check for the capability they need rather than for a
/// concrete mapper type.
pub trait Mapper: fmt::Debug + Send + Sync {
    /// Field name used in conditions.
    fn field(&self) -> &str;

    /// Short type label used in error messages ("string", "geo_point", ...).
    fn kind(&self) -> &'static str;

    /// Row columns this mapper reads.
    fn columns(&self) -> Vec<&str>;

    /// Base type of single-column mappers; `None` for composite mappers.
    fn base_type(&self) -> Option<BaseType> {
        None
    }

    /// Convert a loose value into this mapper's base representation.
    fn to_base(&self, field: &str, _value: &Value) -> Result<BaseValue> {
        Err(ConditionError::wrong_mapper(field, "single column", self.kind()))
    }

    /// Whether text values are tokenized by an analyzer.
    fn is_analyzed(&self) -> bool {
        false
    }

    /// Analyzer name, for analyzed text mappers that don't use the default.
    fn analyzer(&self) -> Option<&str> {
        None
    }

    fn geo_point(&self) -> Option<&GeoPointMapper> {
        None
    }

    /// Strategy for arbitrary shape predicates.
    fn shape_strategy(&self) -> Option<SpatialStrategy> {
        None
    }

    fn bitemporal(&self) -> Option<&BitemporalMapper> {
        None
    }

    fn date_range(&self) -> Option<&DateRangeMapper> {
        None
    }

    /// Index the mapper's columns of `row`.
    fn index(&self, row: &Row, analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>>;
}

/// Error for a value a mapper can't convert.
pub(crate) fn unconvertible(field: &str, expected: &str, value: &Value) -> ConditionError {
    ConditionError::invalid(
        "value",
        format!(
            "Field '{}' requires {}, but found '{}'",
            field, expected, value
        ),
    )
}
