// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Interval conditions over bitemporal and date-range fields.
//!
//! Both compile into plain numeric range clauses over the sub-fields the
//! mappers index, so no dedicated interval index is needed.
//!
//! Bitemporal, per axis (valid time, then transaction time):
//!
//! ```text
//! overlap:      from ∈ [qFrom, qTo]   OR   to ∈ [qFrom, qTo]
//! containment:  from ∈ [MIN, qFrom]   AND  to ∈ [qTo, MAX]
//! axis:         overlap OR containment
//! ```

use serde::{Deserialize, Serialize};

use super::{check_field, resolve_mapper};
use crate::error::{ConditionError, Result};
use crate::query::{BooleanQuery, Query, RangeQuery};
use crate::schema::{Schema, MAX_INSTANT, MIN_INSTANT};
use crate::value::Value;

fn closed(field: String, lower: i64, upper: i64) -> Query {
    Query::LongRange(RangeQuery::closed(field, lower, upper))
}

fn check_order(from_name: &str, to_name: &str, from: i64, to: i64) -> Result<()> {
    if from > to {
        return Err(ConditionError::invalid(
            from_name,
            format!(
                "{} ({}) must be less than or equal to {} ({})",
                from_name, from, to_name, to
            ),
        ));
    }
    Ok(())
}

/// Stored interval overlaps or contains `[from, to]`.
fn axis_query(from_field: String, to_field: String, from: i64, to: i64) -> Query {
    let overlap = BooleanQuery::new()
        .should(closed(from_field.clone(), from, to))
        .should(closed(to_field.clone(), from, to))
        .build();
    let containment = BooleanQuery::new()
        .must(closed(from_field, MIN_INSTANT, from))
        .must(closed(to_field, to, MAX_INSTANT))
        .build();
    BooleanQuery::new().should(overlap).should(containment).build()
}

/// Valid-time × transaction-time interval predicate.
///
/// Unset endpoints default to [`MIN_INSTANT`] / [`MAX_INSTANT`]. Endpoints
/// may be epoch millis or text in the mapper's date pattern, so they are
/// resolved against the mapper at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitemporalCondition {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vt_from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vt_to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tt_from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tt_to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl BitemporalCondition {
    pub fn new(field: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            vt_from: None,
            vt_to: None,
            tt_from: None,
            tt_to: None,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn vt_from(mut self, value: impl Into<Value>) -> Self {
        self.vt_from = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub fn vt_to(mut self, value: impl Into<Value>) -> Self {
        self.vt_to = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub fn tt_from(mut self, value: impl Into<Value>) -> Self {
        self.tt_from = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub fn tt_to(mut self, value: impl Into<Value>) -> Self {
        self.tt_to = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = resolve_mapper(schema, &self.field)?;
        let bitemporal = mapper
            .bitemporal()
            .ok_or_else(|| ConditionError::wrong_mapper(&self.field, "bitemporal", mapper.kind()))?;

        let resolve = |value: &Option<Value>, default: i64| match value.as_ref().filter(|v| !v.is_null()) {
            Some(value) => bitemporal.parse_bitemporal_date(value),
            None => Ok(default),
        };
        let vt_from = resolve(&self.vt_from, MIN_INSTANT)?;
        let vt_to = resolve(&self.vt_to, MAX_INSTANT)?;
        let tt_from = resolve(&self.tt_from, MIN_INSTANT)?;
        let tt_to = resolve(&self.tt_to, MAX_INSTANT)?;
        check_order("vt_from", "vt_to", vt_from, vt_to)?;
        check_order("tt_from", "tt_to", tt_from, tt_to)?;

        let valid_time = axis_query(bitemporal.vt_from_field(), bitemporal.vt_to_field(), vt_from, vt_to);
        let transaction_time =
            axis_query(bitemporal.tt_from_field(), bitemporal.tt_to_field(), tt_from, tt_to);
        Ok(BooleanQuery::new().must(valid_time).must(transaction_time).build())
    }
}

/// Relation between the stored date range and the query range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeOperation {
    /// The ranges share at least one instant
    #[default]
    Intersects,
    /// The stored range lies inside the query range
    IsWithin,
    /// The stored range covers the query range
    Contains,
}

/// Date range field related to `[from, to]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeCondition {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<Value>,
    #[serde(default)]
    operation: DateRangeOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl DateRangeCondition {
    pub fn new(field: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            from: None,
            to: None,
            operation: DateRangeOperation::default(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.from = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub fn to(mut self, value: impl Into<Value>) -> Self {
        self.to = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    pub fn with_operation(mut self, operation: DateRangeOperation) -> Self {
        self.operation = operation;
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = resolve_mapper(schema, &self.field)?;
        let date_range = mapper
            .date_range()
            .ok_or_else(|| ConditionError::wrong_mapper(&self.field, "date_range", mapper.kind()))?;

        let from = match &self.from {
            Some(value) => date_range.parse(value)?,
            None => MIN_INSTANT,
        };
        let to = match &self.to {
            Some(value) => date_range.parse(value)?,
            None => MAX_INSTANT,
        };
        check_order("from", "to", from, to)?;

        let (from_field, to_field) = (date_range.from_field(), date_range.to_field());
        let (stored_from, stored_to) = match self.operation {
            DateRangeOperation::Intersects => (
                closed(from_field, MIN_INSTANT, to),
                closed(to_field, from, MAX_INSTANT),
            ),
            DateRangeOperation::IsWithin => (closed(from_field, from, to), closed(to_field, from, to)),
            DateRangeOperation::Contains => (
                closed(from_field, MIN_INSTANT, from),
                closed(to_field, to, MAX_INSTANT),
            ),
        };
        Ok(BooleanQuery::new().must(stored_from).must(stored_to).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BitemporalMapper, DateRangeMapper};

    fn schema() -> Schema {
        Schema::new()
            .string("name")
            .add_mapper(
                BitemporalMapper::new("bt", "vt_from", "vt_to", "tt_from", "tt_to", "%Y/%m/%d")
                    .now_value("2200/01/01"),
            )
            .add_mapper(DateRangeMapper::new("stay", "start", "end", "%Y/%m/%d"))
    }

    #[test]
    fn test_bitemporal_unset_is_full_domain() {
        let query = BitemporalCondition::new("bt")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        let expected = BooleanQuery::new()
            .must(axis_query("bt.vtFrom".into(), "bt.vtTo".into(), MIN_INSTANT, MAX_INSTANT))
            .must(axis_query("bt.ttFrom".into(), "bt.ttTo".into(), MIN_INSTANT, MAX_INSTANT))
            .build();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_bitemporal_rendering() {
        let query = BitemporalCondition::new("bt")
            .unwrap()
            .vt_to(100)
            .compile_unboosted(&schema())
            .unwrap();
        let rendered = query.to_string();
        assert!(
            rendered.starts_with(
                "+((bt.vtFrom:[0 TO 100] bt.vtTo:[0 TO 100]) (+bt.vtFrom:[0 TO 0] +bt.vtTo:[100 TO"
            ),
            "got {}",
            rendered
        );
    }

    #[test]
    fn test_bitemporal_now_and_ordering() {
        let schema = schema();
        assert!(BitemporalCondition::new("bt")
            .unwrap()
            .vt_from("1970/01/02")
            .vt_to("2200/01/01")
            .compile_unboosted(&schema)
            .is_ok());

        let err = BitemporalCondition::new("bt")
            .unwrap()
            .tt_from(10)
            .tt_to(5)
            .compile_unboosted(&schema)
            .unwrap_err();
        assert_eq!(err.to_string(), "tt_from (10) must be less than or equal to tt_to (5)");
    }

    #[test]
    fn test_bitemporal_requires_capability() {
        let err = BitemporalCondition::new("name")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'name' requires a bitemporal mapper, but found a 'string' mapper"
        );
    }

    #[test]
    fn test_date_range_operations() {
        let condition = DateRangeCondition::new("stay").unwrap().from(10).to(20);

        let intersects = condition.clone().compile_unboosted(&schema()).unwrap();
        assert_eq!(
            intersects.to_string(),
            format!("+stay.from:[0 TO 20] +stay.to:[10 TO {}]", MAX_INSTANT)
        );

        let within = condition
            .clone()
            .with_operation(DateRangeOperation::IsWithin)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(within.to_string(), "+stay.from:[10 TO 20] +stay.to:[10 TO 20]");

        let contains = condition
            .with_operation(DateRangeOperation::Contains)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(
            contains.to_string(),
            format!("+stay.from:[0 TO 10] +stay.to:[20 TO {}]", MAX_INSTANT)
        );
    }

    #[test]
    fn test_date_range_serde() {
        let condition: DateRangeCondition = serde_json::from_str(
            r#"{"field": "stay", "from": "1970/01/01", "operation": "is_within"}"#,
        )
        .unwrap();
        assert_eq!(
            condition,
            DateRangeCondition::new("stay")
                .unwrap()
                .from("1970/01/01")
                .with_operation(DateRangeOperation::IsWithin)
        );
    }
}
