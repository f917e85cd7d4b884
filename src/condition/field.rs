// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Single-field conditions dispatched on the mapper's base type.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    check_clauses, check_field, match_query, phrase_query, range_query, resolve_mapper,
    should_group, text_mapper,
};
use crate::error::{ConditionError, Result};
use crate::query::{FuzzyQuery, PrefixQuery, Query, RegexpQuery, WildcardQuery};
use crate::schema::Schema;
use crate::value::Value;

/// Largest edit distance a fuzzy condition accepts.
pub const MAX_EDITS: u8 = 2;
pub const DEFAULT_MAX_EDITS: u8 = MAX_EDITS;
pub const DEFAULT_PREFIX_LENGTH: u32 = 0;
pub const DEFAULT_MAX_EXPANSIONS: u32 = 50;

fn check_value(value: &Value) -> Result<()> {
    if value.is_null() {
        return Err(ConditionError::invalid("value", "Value required"));
    }
    Ok(())
}

fn check_text(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ConditionError::invalid("value", "Value required"));
    }
    Ok(())
}

/// Text value of `mapper` for a text-only condition.
fn text_value(schema: &Schema, field: &str, value: &str, condition: &'static str) -> Result<String> {
    let mapper = text_mapper(schema, field, condition)?;
    let base = mapper.to_base(field, &Value::Text(value.to_string()))?;
    let found = base.base_type();
    base.into_text()
        .ok_or_else(|| ConditionError::wrong_mapper(field, "text", found.to_string()))
}

/// Field equals value; analyzed text becomes an exact phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCondition {
    field: String,
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl MatchCondition {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_value(&self.value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = resolve_mapper(schema, &self.field)?;
        match_query(schema, mapper, &self.field, &self.value)
    }
}

/// Field equals any of the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainsCondition {
    field: String,
    values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl ContainsCondition {
    pub fn new<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        if self.values.is_empty() {
            return Err(ConditionError::invalid("values", "Values required"));
        }
        self.values.iter().try_for_each(check_value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        check_clauses(schema, self.values.len())?;
        let mapper = resolve_mapper(schema, &self.field)?;
        let queries = self
            .values
            .iter()
            .map(|value| match_query(schema, mapper, &self.field, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(should_group(queries))
    }
}

/// Field value within an interval.
///
/// Absent bounds are open; both flags default to exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCondition {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lower: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper: Option<Value>,
    #[serde(default)]
    include_lower: bool,
    #[serde(default)]
    include_upper: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl RangeCondition {
    pub fn new(field: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            lower: None,
            upper: None,
            include_lower: false,
            include_upper: false,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    /// Lower bound; a null value leaves the bound open.
    pub fn lower(mut self, lower: impl Into<Value>) -> Self {
        self.lower = Some(lower.into()).filter(|v| !v.is_null());
        self
    }

    /// Upper bound; a null value leaves the bound open.
    pub fn upper(mut self, upper: impl Into<Value>) -> Self {
        self.upper = Some(upper.into()).filter(|v| !v.is_null());
        self
    }

    pub fn include_lower(mut self, include: bool) -> Self {
        self.include_lower = include;
        self
    }

    pub fn include_upper(mut self, include: bool) -> Self {
        self.include_upper = include;
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = resolve_mapper(schema, &self.field)?;
        range_query(
            mapper,
            &self.field,
            self.lower.as_ref().filter(|v| !v.is_null()),
            self.upper.as_ref().filter(|v| !v.is_null()),
            self.include_lower,
            self.include_upper,
        )
    }
}

/// Terms starting with a prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixCondition {
    field: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl PrefixCondition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_text(&self.value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let prefix = text_value(schema, &self.field, &self.value, "prefix")?;
        Ok(Query::Prefix(PrefixQuery {
            field: self.field.clone(),
            prefix,
        }))
    }
}

/// Terms within an edit distance of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyCondition {
    field: String,
    value: String,
    #[serde(default = "default_max_edits")]
    max_edits: u8,
    #[serde(default)]
    prefix_length: u32,
    #[serde(default = "default_max_expansions")]
    max_expansions: u32,
    #[serde(default = "default_transpositions")]
    transpositions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

fn default_max_edits() -> u8 { DEFAULT_MAX_EDITS }
fn default_max_expansions() -> u32 { DEFAULT_MAX_EXPANSIONS }
fn default_transpositions() -> bool { true }

impl FuzzyCondition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            max_edits: DEFAULT_MAX_EDITS,
            prefix_length: DEFAULT_PREFIX_LENGTH,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            transpositions: true,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn with_max_edits(mut self, max_edits: u8) -> Result<Self> {
        self.max_edits = max_edits;
        self.validate()?;
        Ok(self)
    }

    /// Leading characters that must match exactly.
    pub fn with_prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: u32) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Count an adjacent swap as one edit.
    pub fn with_transpositions(mut self, transpositions: bool) -> Self {
        self.transpositions = transpositions;
        self
    }

    pub fn max_edits(&self) -> u8 {
        self.max_edits
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_text(&self.value)?;
        if self.max_edits > MAX_EDITS {
            return Err(ConditionError::invalid(
                "max_edits",
                format!(
                    "max_edits must be between 0 and {}, but found {}",
                    MAX_EDITS, self.max_edits
                ),
            ));
        }
        Ok(())
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let term = text_value(schema, &self.field, &self.value, "fuzzy")?;
        Ok(Query::Fuzzy(FuzzyQuery {
            field: self.field.clone(),
            term,
            max_edits: self.max_edits,
            prefix_length: self.prefix_length,
            max_expansions: self.max_expansions,
            transpositions: self.transpositions,
        }))
    }
}

/// Analyzed terms in order, at most `slop` positions apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseCondition {
    field: String,
    value: String,
    #[serde(default)]
    slop: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl PhraseCondition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            slop: 0,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_text(&self.value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = text_mapper(schema, &self.field, "phrase")?;
        if !mapper.is_analyzed() {
            let term = text_value(schema, &self.field, &self.value, "phrase")?;
            return Ok(Query::term(&self.field, term));
        }
        let terms = schema.analyzer_for(&self.field).analyze(&self.value);
        Ok(phrase_query(&self.field, terms, self.slop))
    }
}

/// Terms matching a `*` / `?` pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardCondition {
    field: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl WildcardCondition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_text(&self.value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let pattern = text_value(schema, &self.field, &self.value, "wildcard")?;
        Ok(Query::Wildcard(WildcardQuery {
            field: self.field.clone(),
            pattern,
        }))
    }
}

/// Terms matching a regular expression in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexpCondition {
    field: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl RegexpCondition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_text(&self.value)?;
        check_regexp(&self.value)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        text_mapper(schema, &self.field, "regexp")?;
        Ok(Query::Regexp(RegexpQuery {
            field: self.field.clone(),
            pattern: self.value.clone(),
        }))
    }
}

pub(super) fn check_regexp(pattern: &str) -> Result<()> {
    Regex::new(pattern).map(|_| ()).map_err(|e| {
        ConditionError::invalid(
            "value",
            format!("Invalid regular expression '{}': {}", pattern, e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BooleanQuery, PhraseQuery, RangeQuery};

    fn schema() -> Schema {
        Schema::new()
            .string("name")
            .text("bio")
            .integer("age")
            .long("id")
            .float("weight")
            .date("born")
    }

    #[test]
    fn test_match_requires_value() {
        assert!(MatchCondition::new("name", Value::Null).is_err());
        let err = MatchCondition::new("  ", "x").unwrap_err();
        assert_eq!(err.to_string(), "Field name required");
    }

    #[test]
    fn test_match_analyzed_text_is_phrase() {
        let query = MatchCondition::new("bio", "Hello Big World")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(
            query,
            Query::Phrase(PhraseQuery {
                field: "bio".into(),
                terms: vec!["hello".into(), "big".into(), "world".into()],
                slop: 0,
            })
        );
    }

    #[test]
    fn test_match_numeric_is_point_range() {
        let query = MatchCondition::new("weight", 1.5)
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query, Query::FloatRange(RangeQuery::closed("weight", 1.5, 1.5)));

        let err = MatchCondition::new("age", "old")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap_err();
        assert!(matches!(err, ConditionError::InvalidParameter { .. }));
    }

    #[test]
    fn test_contains_is_should_group() {
        let query = ContainsCondition::new("age", [10, 20])
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        let expected = BooleanQuery::new()
            .should(Query::IntRange(RangeQuery::closed("age", 10, 10)))
            .should(Query::IntRange(RangeQuery::closed("age", 20, 20)))
            .build();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_contains_rejects_empty_and_null() {
        assert!(ContainsCondition::new("age", Vec::<i32>::new()).is_err());
        assert!(ContainsCondition::new("age", vec![Value::Int(1), Value::Null]).is_err());
    }

    #[test]
    fn test_range_both_open() {
        let query = RangeCondition::new("id").unwrap().compile_unboosted(&schema()).unwrap();
        assert_eq!(
            query,
            Query::LongRange(RangeQuery {
                field: "id".into(),
                lower: None,
                upper: None,
                include_lower: false,
                include_upper: false,
            })
        );
    }

    #[test]
    fn test_range_text_and_dates() {
        let query = RangeCondition::new("name")
            .unwrap()
            .lower("a")
            .upper("m")
            .include_lower(true)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query.to_string(), "name:[a TO m}");

        let query = RangeCondition::new("born")
            .unwrap()
            .lower(Value::Null)
            .upper("1970/01/01 00:00:01.000 +0000")
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query.to_string(), "born:{* TO 1000}");
    }

    #[test]
    fn test_text_only_conditions_reject_numbers() {
        let err = PrefixCondition::new("age", "1")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "prefix condition is not supported by 'integer' mapper of field 'age'"
        );
        assert!(FuzzyCondition::new("id", "1").unwrap().compile_unboosted(&schema()).is_err());
        assert!(WildcardCondition::new("age", "1*").unwrap().compile_unboosted(&schema()).is_err());
        assert!(RegexpCondition::new("age", "1.*").unwrap().compile_unboosted(&schema()).is_err());
    }

    #[test]
    fn test_fuzzy_defaults_and_bounds() {
        let fuzzy = FuzzyCondition::new("name", "tom").unwrap();
        assert_eq!(fuzzy.max_edits(), 2);
        assert!(fuzzy.clone().with_max_edits(3).is_err());
        assert!(fuzzy.clone().with_max_edits(0).is_ok());

        let query = fuzzy
            .with_transpositions(false)
            .with_prefix_length(1)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(
            query,
            Query::Fuzzy(FuzzyQuery {
                field: "name".into(),
                term: "tom".into(),
                max_edits: 2,
                prefix_length: 1,
                max_expansions: 50,
                transpositions: false,
            })
        );
    }

    #[test]
    fn test_fuzzy_serde_defaults() {
        let fuzzy: FuzzyCondition =
            serde_json::from_str(r#"{"field": "name", "value": "tom"}"#).unwrap();
        assert_eq!(fuzzy, FuzzyCondition::new("name", "tom").unwrap());
    }

    #[test]
    fn test_phrase_slop() {
        let query = PhraseCondition::new("bio", "big data")
            .unwrap()
            .with_slop(2)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query.to_string(), "bio:\"big data\"~2");

        let query = PhraseCondition::new("name", "Big Data")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query, Query::term("name", "Big Data"));
    }

    #[test]
    fn test_regexp_validated_eagerly() {
        let err = RegexpCondition::new("name", "(unclosed").unwrap_err();
        assert!(err.to_string().starts_with("Invalid regular expression '(unclosed'"));
    }
}
