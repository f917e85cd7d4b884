// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Date parsing into epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::mapper::unconvertible;
use crate::error::{ConditionError, Result};
use crate::value::Value;

/// Parses dates given as epoch millis or as text in a chrono pattern.
///
/// Patterns without a zone are read as UTC; date-only patterns as midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    pattern: String,
}

impl DateParser {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Epoch milliseconds of `value`.
    pub fn parse(&self, field: &str, value: &Value) -> Result<i64> {
        match value {
            Value::Int(millis) => Ok(*millis),
            Value::Float(millis) if millis.is_finite() => Ok(millis.trunc() as i64),
            Value::Text(text) => self.parse_text(field, text),
            other => Err(unconvertible(field, "a date", other)),
        }
    }

    fn parse_text(&self, field: &str, text: &str) -> Result<i64> {
        let text = text.trim();
        if let Ok(date_time) = DateTime::parse_from_str(text, &self.pattern) {
            return Ok(date_time.timestamp_millis());
        }
        if let Ok(date_time) = NaiveDateTime::parse_from_str(text, &self.pattern) {
            return Ok(date_time.and_utc().timestamp_millis());
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, &self.pattern) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(midnight.and_utc().timestamp_millis());
            }
        }
        Err(ConditionError::invalid(
            "value",
            format!(
                "Field '{}' with value '{}' can not be parsed as date with pattern '{}'",
                field, text, self.pattern
            ),
        ))
    }
}
