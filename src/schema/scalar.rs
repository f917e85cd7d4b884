// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Single-column mappers with a base value type.

use super::date::DateParser;
use super::mapper::{unconvertible, BaseType, BaseValue, FieldValue, IndexedField, Mapper};
use crate::analysis::Analyzer;
use crate::error::Result;
use crate::value::{Row, Value};

/// Column type of a [`ScalarMapper`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    /// Unanalyzed text, stored as one term
    String { case_sensitive: bool },
    /// Analyzed text; `None` uses the schema's default analyzer
    Text { analyzer: Option<String> },
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    /// Epoch milliseconds, parsed from text with `parser`
    Date { parser: DateParser },
}

/// Maps one column (or collection column) to one indexed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMapper {
    field: String,
    column: String,
    kind: ScalarKind,
}

impl ScalarMapper {
    pub fn new(field: impl Into<String>, kind: ScalarKind) -> Self {
        let field = field.into();
        Self {
            column: field.clone(),
            field,
            kind,
        }
    }

    pub fn string(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::String { case_sensitive: true })
    }

    pub fn text(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Text { analyzer: None })
    }

    pub fn integer(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Integer)
    }

    pub fn long(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Long)
    }

    pub fn float(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Float)
    }

    pub fn double(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Double)
    }

    pub fn boolean(field: impl Into<String>) -> Self {
        Self::new(field, ScalarKind::Boolean)
    }

    pub fn date(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            ScalarKind::Date {
                parser: DateParser::new(pattern),
            },
        )
    }

    /// Read from `column` instead of the column named like the field.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn scalar_kind(&self) -> &ScalarKind {
        &self.kind
    }

    fn to_text(&self, field: &str, value: &Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
            other => Err(unconvertible(field, "a text value", other)),
        }
    }
}

impl Mapper for ScalarMapper {
    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> &'static str {
        match self.kind {
            ScalarKind::String { .. } => "string",
            ScalarKind::Text { .. } => "text",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Date { .. } => "date",
        }
    }

    fn columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn base_type(&self) -> Option<BaseType> {
        let base = match self.kind {
            ScalarKind::String { .. } | ScalarKind::Text { .. } | ScalarKind::Boolean => {
                BaseType::Text
            }
            ScalarKind::Integer => BaseType::Int32,
            ScalarKind::Long | ScalarKind::Date { .. } => BaseType::Int64,
            ScalarKind::Float => BaseType::Float32,
            ScalarKind::Double => BaseType::Float64,
        };
        Some(base)
    }

    fn to_base(&self, field: &str, value: &Value) -> Result<BaseValue> {
        match &self.kind {
            ScalarKind::String { case_sensitive } => {
                let text = self.to_text(field, value)?;
                Ok(BaseValue::Text(if *case_sensitive { text } else { text.to_lowercase() }))
            }
            ScalarKind::Text { .. } => self.to_text(field, value).map(BaseValue::Text),
            ScalarKind::Boolean => match value {
                Value::Bool(b) => Ok(BaseValue::Text(b.to_string())),
                Value::Text(s) if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") => {
                    Ok(BaseValue::Text(s.to_ascii_lowercase()))
                }
                other => Err(unconvertible(field, "a boolean", other)),
            },
            ScalarKind::Integer => {
                let n = to_number(value).ok_or_else(|| unconvertible(field, "an integer", value))?;
                if n < i32::MIN as f64 || n > i32::MAX as f64 {
                    return Err(unconvertible(field, "an integer", value));
                }
                Ok(BaseValue::Int32(n as i32))
            }
            ScalarKind::Long => match value {
                Value::Int(n) => Ok(BaseValue::Int64(*n)),
                _ => {
                    let n = to_number(value).ok_or_else(|| unconvertible(field, "a long", value))?;
                    if n < i64::MIN as f64 || n >= i64::MAX as f64 {
                        return Err(unconvertible(field, "a long", value));
                    }
                    Ok(BaseValue::Int64(n as i64))
                }
            },
            ScalarKind::Float => {
                let n = to_number(value).ok_or_else(|| unconvertible(field, "a float", value))?;
                Ok(BaseValue::Float32(n as f32))
            }
            ScalarKind::Double => {
                let n = to_number(value).ok_or_else(|| unconvertible(field, "a double", value))?;
                Ok(BaseValue::Float64(n))
            }
            ScalarKind::Date { parser } => parser.parse(field, value).map(BaseValue::Int64),
        }
    }

    fn is_analyzed(&self) -> bool {
        matches!(self.kind, ScalarKind::Text { .. })
    }

    fn analyzer(&self) -> Option<&str> {
        match &self.kind {
            ScalarKind::Text { analyzer } => analyzer.as_deref(),
            _ => None,
        }
    }

    fn index(&self, row: &Row, analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>> {
        let Some(column) = row.get(&self.column) else {
            return Ok(Vec::new());
        };

        let mut fields = Vec::new();
        for value in column.scalars() {
            let base = self.to_base(&self.field, value)?;
            let stored = match base {
                BaseValue::Text(text) if self.is_analyzed() => {
                    FieldValue::Terms(analyzer.analyze(&text))
                }
                other => other.into(),
            };
            fields.push(IndexedField::new(self.field.clone(), stored));
        }
        Ok(fields)
    }
}

/// Numeric reading of a loose value; integers are truncated toward zero.
fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Int(n) => *n as f64,
        Value::Float(n) => *n,
        Value::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
