// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Interval mappers: bitemporal (valid time × transaction time) and date range.

use super::date::DateParser;
use super::mapper::{FieldValue, IndexedField, Mapper};
use crate::analysis::Analyzer;
use crate::error::{ConditionError, Result};
use crate::value::{Row, Value};

/// Smallest representable instant.
pub const MIN_INSTANT: i64 = 0;
/// Largest representable instant; also what the "now" sentinel maps to.
pub const MAX_INSTANT: i64 = i64::MAX;

/// Four-column bitemporal mapper.
///
/// Indexes `<field>.vtFrom`, `<field>.vtTo`, `<field>.ttFrom` and
/// `<field>.ttTo` as epoch milliseconds. A row carries either all four
/// columns or none of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitemporalMapper {
    field: String,
    vt_from: String,
    vt_to: String,
    tt_from: String,
    tt_to: String,
    parser: DateParser,
    now_value: Option<String>,
}

impl BitemporalMapper {
    pub fn new(
        field: impl Into<String>,
        vt_from: impl Into<String>,
        vt_to: impl Into<String>,
        tt_from: impl Into<String>,
        tt_to: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            vt_from: vt_from.into(),
            vt_to: vt_to.into(),
            tt_from: tt_from.into(),
            tt_to: tt_to.into(),
            parser: DateParser::new(pattern),
            now_value: None,
        }
    }

    /// Text value that stands for "still current" and maps to [`MAX_INSTANT`].
    pub fn now_value(mut self, now_value: impl Into<String>) -> Self {
        self.now_value = Some(now_value.into());
        self
    }

    pub fn vt_from_field(&self) -> String {
        format!("{}.vtFrom", self.field)
    }

    pub fn vt_to_field(&self) -> String {
        format!("{}.vtTo", self.field)
    }

    pub fn tt_from_field(&self) -> String {
        format!("{}.ttFrom", self.field)
    }

    pub fn tt_to_field(&self) -> String {
        format!("{}.ttTo", self.field)
    }

    /// Epoch milliseconds of `value`, honouring the "now" sentinel.
    pub fn parse_bitemporal_date(&self, value: &Value) -> Result<i64> {
        if let (Some(now), Value::Text(text)) = (&self.now_value, value) {
            if text.trim() == now {
                return Ok(MAX_INSTANT);
            }
        }
        let millis = self.parser.parse(&self.field, value)?;
        if millis < MIN_INSTANT {
            return Err(ConditionError::invalid(
                "value",
                format!(
                    "Field '{}' requires a date after the epoch, but found '{}'",
                    self.field, value
                ),
            ));
        }
        Ok(millis)
    }

    fn read(&self, row: &Row, column: &str) -> Result<Option<i64>> {
        match row.get(column).filter(|v| !v.is_null()) {
            Some(value) => self.parse_bitemporal_date(value).map(Some),
            None => Ok(None),
        }
    }
}

impl Mapper for BitemporalMapper {
    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> &'static str {
        "bitemporal"
    }

    fn columns(&self) -> Vec<&str> {
        vec![
            self.vt_from.as_str(),
            self.vt_to.as_str(),
            self.tt_from.as_str(),
            self.tt_to.as_str(),
        ]
    }

    fn bitemporal(&self) -> Option<&BitemporalMapper> {
        Some(self)
    }

    fn index(&self, row: &Row, _analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>> {
        let values = [
            self.read(row, &self.vt_from)?,
            self.read(row, &self.vt_to)?,
            self.read(row, &self.tt_from)?,
            self.read(row, &self.tt_to)?,
        ];
        if values.iter().all(Option::is_none) {
            return Ok(Vec::new());
        }

        let columns = self.columns();
        let mut resolved = [0i64; 4];
        for (i, value) in values.iter().enumerate() {
            resolved[i] = value.ok_or_else(|| {
                ConditionError::invalid(
                    columns[i],
                    format!("Field '{}' requires column '{}'", self.field, columns[i]),
                )
            })?;
        }
        let [vt_from, vt_to, tt_from, tt_to] = resolved;

        if vt_from > vt_to {
            return Err(ConditionError::invalid(
                "vt_from",
                format!("vt_from ({}) must be less than or equal to vt_to ({})", vt_from, vt_to),
            ));
        }
        if tt_from > tt_to {
            return Err(ConditionError::invalid(
                "tt_from",
                format!("tt_from ({}) must be less than or equal to tt_to ({})", tt_from, tt_to),
            ));
        }

        Ok(vec![
            IndexedField::new(self.vt_from_field(), FieldValue::Int64(vt_from)),
            IndexedField::new(self.vt_to_field(), FieldValue::Int64(vt_to)),
            IndexedField::new(self.tt_from_field(), FieldValue::Int64(tt_from)),
            IndexedField::new(self.tt_to_field(), FieldValue::Int64(tt_to)),
        ])
    }
}

/// Date interval stored as `<field>.from` and `<field>.to`.
///
/// A missing start is [`MIN_INSTANT`], a missing end [`MAX_INSTANT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeMapper {
    field: String,
    from: String,
    to: String,
    parser: DateParser,
}

impl DateRangeMapper {
    pub fn new(
        field: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            from: from.into(),
            to: to.into(),
            parser: DateParser::new(pattern),
        }
    }

    pub fn from_field(&self) -> String {
        format!("{}.from", self.field)
    }

    pub fn to_field(&self) -> String {
        format!("{}.to", self.field)
    }

    pub fn parse(&self, value: &Value) -> Result<i64> {
        self.parser.parse(&self.field, value)
    }
}

impl Mapper for DateRangeMapper {
    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> &'static str {
        "date_range"
    }

    fn columns(&self) -> Vec<&str> {
        vec![self.from.as_str(), self.to.as_str()]
    }

    fn date_range(&self) -> Option<&DateRangeMapper> {
        Some(self)
    }

    fn index(&self, row: &Row, _analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>> {
        let from = row.get(&self.from).filter(|v| !v.is_null());
        let to = row.get(&self.to).filter(|v| !v.is_null());
        if from.is_none() && to.is_none() {
            return Ok(Vec::new());
        }

        let from = from.map(|v| self.parse(v)).transpose()?.unwrap_or(MIN_INSTANT);
        let to = to.map(|v| self.parse(v)).transpose()?.unwrap_or(MAX_INSTANT);
        if from > to {
            return Err(ConditionError::invalid(
                "from",
                format!("from ({}) must be less than or equal to to ({})", from, to),
            ));
        }

        Ok(vec![
            IndexedField::new(self.from_field(), FieldValue::Int64(from)),
            IndexedField::new(self.to_field(), FieldValue::Int64(to)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;

    fn bitemporal() -> BitemporalMapper {
        BitemporalMapper::new("bt", "vt_from", "vt_to", "tt_from", "tt_to", "%Y/%m/%d")
            .now_value("2200/01/01")
    }

    fn row(values: [i64; 4]) -> Row {
        ["vt_from", "vt_to", "tt_from", "tt_to"]
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), Value::Int(v)))
            .collect()
    }

    #[test]
    fn test_sub_field_names() {
        let mapper = bitemporal();
        assert_eq!(mapper.vt_from_field(), "bt.vtFrom");
        assert_eq!(mapper.tt_to_field(), "bt.ttTo");
    }

    #[test]
    fn test_now_sentinel_is_max() {
        let mapper = bitemporal();
        assert_eq!(mapper.parse_bitemporal_date(&Value::from("2200/01/01")).unwrap(), MAX_INSTANT);
        assert_eq!(mapper.parse_bitemporal_date(&Value::Int(5)).unwrap(), 5);
        assert!(mapper.parse_bitemporal_date(&Value::Int(-1)).is_err());
    }

    #[test]
    fn test_index_all_four() {
        let fields = bitemporal().index(&row([0, 100, 5, 50]), &StandardAnalyzer).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1], IndexedField::new("bt.vtTo", FieldValue::Int64(100)));
    }

    #[test]
    fn test_index_rejects_partial_or_inverted() {
        let mapper = bitemporal();
        assert!(mapper.index(&Row::new(), &StandardAnalyzer).unwrap().is_empty());

        let mut partial = row([0, 100, 5, 50]);
        partial.remove("tt_to");
        assert!(mapper.index(&partial, &StandardAnalyzer).is_err());

        assert!(mapper.index(&row([100, 0, 5, 50]), &StandardAnalyzer).is_err());
    }

    #[test]
    fn test_date_range_defaults_open_end() {
        let mapper = DateRangeMapper::new("stay", "start", "end", "%Y/%m/%d");
        let mut row = Row::new();
        row.insert("start".into(), Value::from("1970/01/02"));

        let fields = mapper.index(&row, &StandardAnalyzer).unwrap();
        assert_eq!(fields[0], IndexedField::new("stay.from", FieldValue::Int64(86_400_000)));
        assert_eq!(fields[1], IndexedField::new("stay.to", FieldValue::Int64(MAX_INSTANT)));
    }
}
