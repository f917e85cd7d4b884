// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Loosely-typed input values.
//!
//! Client requests carry values without knowing the target column type;
//! mappers convert them into their canonical base representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A database row: column name to column value.
pub type Row = BTreeMap<String, Value>;

/// Loosely-typed value as it arrives from a client or a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Collection column (list or set)
    List(Vec<Value>),
    /// User-defined type or map column
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Flatten a collection into its elements; scalars yield themselves.
    ///
    /// Nulls are skipped, so an absent column indexes nothing.
    pub fn scalars(&self) -> Vec<&Value> {
        match self {
            Value::Null => Vec::new(),
            Value::List(items) => items.iter().flat_map(Value::scalars).collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 10, 2.5, "x", [1, 2]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(10),
                Value::Float(2.5),
                Value::Text("x".into()),
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            ]
        );
    }

    #[test]
    fn test_scalars_flatten_collections() {
        let value = Value::from(vec![Value::Int(1), Value::Null, Value::from(vec![2, 3])]);
        let flat: Vec<&Value> = value.scalars();
        assert_eq!(flat, vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]);
        assert!(Value::Null.scalars().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("Tom").to_string(), "Tom");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
    }
}
