// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Conditions
//!
//! The declarative condition language and its compiler into [`Query`].
//!
//! # Architecture
//!
//! ```text
//! Condition ──validate──▶ compile_unboosted ──▶ Query ──boost?──▶ Query
//!    │                          │
//!    │                   Schema::mapper(field)
//!    │                          │
//!    └─ Boolean ─ children ─────┘ (recursively, each boosted on its own)
//! ```
//!
//! Each variant is an immutable value. Constructors validate eagerly, and
//! [`Condition::compile`] validates again, so trees that arrived through
//! `serde` are held to the same invariants.
//!
//! # Example
//!
//! ```
//! use search_conditions::{BooleanCondition, Condition, MatchCondition, RangeCondition, Schema};
//!
//! let schema = Schema::new().string("name").integer("age");
//!
//! let condition: Condition = BooleanCondition::new()
//!     .must(MatchCondition::new("name", "Tom").unwrap())
//!     .not(RangeCondition::new("age").unwrap().lower(10).upper(20))
//!     .into();
//!
//! let query = condition.with_boost(2.0).unwrap().compile(&schema).unwrap();
//! assert_eq!(query.to_string(), "(+name:Tom -age:{10 TO 20})^2");
//! ```

mod boolean;
mod field;
mod spatial;
mod syntax;
mod temporal;

pub use boolean::BooleanCondition;
pub use field::{
    ContainsCondition, FuzzyCondition, MatchCondition, PhraseCondition, PrefixCondition,
    RangeCondition, RegexpCondition, WildcardCondition, DEFAULT_MAX_EDITS,
    DEFAULT_MAX_EXPANSIONS, MAX_EDITS,
};
pub use spatial::{GeoBBoxCondition, GeoDistanceCondition, GeoShapeCondition};
pub use syntax::LuceneCondition;
pub use temporal::{BitemporalCondition, DateRangeCondition, DateRangeOperation};

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConditionError, Result};
use crate::metrics;
use crate::query::{BooleanQuery, PhraseQuery, Query, RangeQuery};
use crate::schema::{BaseType, BaseValue, Mapper, Schema};
use crate::value::Value;

/// Matches every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boost: Option<f32>,
}

impl AllCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Matches no document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoneCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boost: Option<f32>,
}

impl NoneCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

macro_rules! conditions {
    ($($variant:ident($ty:ty) => $kind:literal),+ $(,)?) => {
        /// A node of a search condition tree.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        pub enum Condition {
            $(
                #[serde(rename = $kind)]
                $variant($ty),
            )+
        }

        impl Condition {
            /// Short label used in logs, metrics and error messages.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Condition::$variant(_) => $kind,)+
                }
            }

            /// Explicit boost, if any.
            pub fn boost(&self) -> Option<f32> {
                match self {
                    $(Condition::$variant(c) => c.boost,)+
                }
            }

            /// Copy of this condition with `boost` set.
            pub fn with_boost(mut self, boost: f32) -> Result<Self> {
                let boost = Some(check_boost(boost)?);
                match &mut self {
                    $(Condition::$variant(c) => c.boost = boost,)+
                }
                Ok(self)
            }
        }

        $(
            impl From<$ty> for Condition {
                fn from(condition: $ty) -> Self {
                    Condition::$variant(condition)
                }
            }
        )+
    };
}

conditions! {
    All(AllCondition) => "all",
    None(NoneCondition) => "none",
    Boolean(BooleanCondition) => "boolean",
    Match(MatchCondition) => "match",
    Contains(ContainsCondition) => "contains",
    Range(RangeCondition) => "range",
    Prefix(PrefixCondition) => "prefix",
    Fuzzy(FuzzyCondition) => "fuzzy",
    Phrase(PhraseCondition) => "phrase",
    Wildcard(WildcardCondition) => "wildcard",
    Regexp(RegexpCondition) => "regexp",
    GeoBBox(GeoBBoxCondition) => "geo_bbox",
    GeoDistance(GeoDistanceCondition) => "geo_distance",
    GeoShape(GeoShapeCondition) => "geo_shape",
    Bitemporal(BitemporalCondition) => "bitemporal",
    DateRange(DateRangeCondition) => "date_range",
    Lucene(LuceneCondition) => "lucene",
}

impl Condition {
    pub fn all() -> Self {
        AllCondition::new().into()
    }

    pub fn none() -> Self {
        NoneCondition::new().into()
    }

    /// Compile the tree rooted here against `schema`.
    ///
    /// The only entry point callers need; children are compiled through the
    /// same validate / compile / boost sequence without the root bookkeeping.
    #[tracing::instrument(skip(self, schema), fields(kind = self.kind()))]
    pub fn compile(&self, schema: &Schema) -> Result<Query> {
        let start = Instant::now();
        let kind = self.kind();

        match self.compile_boosted(schema) {
            Ok(query) => {
                metrics::record_compile(kind, "success");
                metrics::record_compile_latency(kind, start.elapsed());
                debug!(kind, query = %query, "Compiled condition");
                Ok(query)
            }
            Err(e) => {
                metrics::record_compile(kind, "error");
                metrics::record_error(kind, e.kind());
                debug!(kind, error = %e, "Condition compilation failed");
                Err(e)
            }
        }
    }

    /// Structural checks that don't need a schema.
    pub fn validate(&self) -> Result<()> {
        if let Some(boost) = self.boost() {
            check_boost(boost)?;
        }
        match self {
            Condition::All(_) | Condition::None(_) | Condition::Boolean(_) => Ok(()),
            Condition::Match(c) => c.validate(),
            Condition::Contains(c) => c.validate(),
            Condition::Range(c) => c.validate(),
            Condition::Prefix(c) => c.validate(),
            Condition::Fuzzy(c) => c.validate(),
            Condition::Phrase(c) => c.validate(),
            Condition::Wildcard(c) => c.validate(),
            Condition::Regexp(c) => c.validate(),
            Condition::GeoBBox(c) => c.validate(),
            Condition::GeoDistance(c) => c.validate(),
            Condition::GeoShape(c) => c.validate(),
            Condition::Bitemporal(c) => c.validate(),
            Condition::DateRange(c) => c.validate(),
            Condition::Lucene(c) => c.validate(),
        }
    }

    pub(crate) fn compile_boosted(&self, schema: &Schema) -> Result<Query> {
        self.validate()?;
        let query = self.compile_unboosted(schema)?;
        Ok(match self.boost() {
            Some(boost) => query.boost(boost),
            None => query,
        })
    }

    fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        match self {
            Condition::All(_) => Ok(Query::MatchAll),
            Condition::None(_) => Ok(Query::MatchNone),
            Condition::Boolean(c) => c.compile_unboosted(schema),
            Condition::Match(c) => c.compile_unboosted(schema),
            Condition::Contains(c) => c.compile_unboosted(schema),
            Condition::Range(c) => c.compile_unboosted(schema),
            Condition::Prefix(c) => c.compile_unboosted(schema),
            Condition::Fuzzy(c) => c.compile_unboosted(schema),
            Condition::Phrase(c) => c.compile_unboosted(schema),
            Condition::Wildcard(c) => c.compile_unboosted(schema),
            Condition::Regexp(c) => c.compile_unboosted(schema),
            Condition::GeoBBox(c) => c.compile_unboosted(schema),
            Condition::GeoDistance(c) => c.compile_unboosted(schema),
            Condition::GeoShape(c) => c.compile_unboosted(schema),
            Condition::Bitemporal(c) => c.compile_unboosted(schema),
            Condition::DateRange(c) => c.compile_unboosted(schema),
            Condition::Lucene(c) => c.compile_unboosted(schema),
        }
    }
}

/// Boost must be a finite, non-negative multiplier.
pub(crate) fn check_boost(boost: f32) -> Result<f32> {
    if !boost.is_finite() || boost < 0.0 {
        return Err(ConditionError::invalid(
            "boost",
            format!("Boost must be a finite non-negative number, but found {}", boost),
        ));
    }
    Ok(boost)
}

pub(crate) fn check_field(field: &str) -> Result<()> {
    if field.trim().is_empty() {
        return Err(ConditionError::invalid("field", "Field name required"));
    }
    Ok(())
}

pub(crate) fn check_clauses(schema: &Schema, clauses: usize) -> Result<()> {
    let limit = schema.config().max_boolean_clauses;
    if clauses > limit {
        return Err(ConditionError::invalid(
            "clauses",
            format!("Too many boolean clauses: {} exceeds the limit of {}", clauses, limit),
        ));
    }
    Ok(())
}

pub(crate) fn resolve_mapper<'a>(schema: &'a Schema, field: &str) -> Result<&'a dyn Mapper> {
    schema
        .mapper(field)
        .ok_or_else(|| ConditionError::missing_field(field))
}

/// Mapper of a text field, or an error naming `condition`.
pub(crate) fn text_mapper<'a>(
    schema: &'a Schema,
    field: &str,
    condition: &'static str,
) -> Result<&'a dyn Mapper> {
    let mapper = resolve_mapper(schema, field)?;
    match mapper.base_type() {
        Some(BaseType::Text) => Ok(mapper),
        _ => Err(ConditionError::unsupported(condition, field, mapper.kind())),
    }
}

/// Equality predicate for one value, dispatched on the mapper's base type.
pub(crate) fn match_query(
    schema: &Schema,
    mapper: &dyn Mapper,
    field: &str,
    value: &Value,
) -> Result<Query> {
    let query = match mapper.to_base(field, value)? {
        BaseValue::Text(text) if mapper.is_analyzed() => {
            phrase_query(field, schema.analyzer_for(field).analyze(&text), 0)
        }
        BaseValue::Text(text) => Query::term(field, text),
        BaseValue::Int32(v) => Query::IntRange(RangeQuery::closed(field, v, v)),
        BaseValue::Int64(v) => Query::LongRange(RangeQuery::closed(field, v, v)),
        BaseValue::Float32(v) => Query::FloatRange(RangeQuery::closed(field, v, v)),
        BaseValue::Float64(v) => Query::DoubleRange(RangeQuery::closed(field, v, v)),
    };
    Ok(query)
}

/// Interval predicate over `mapper`'s base type; `None` bounds are open.
pub(crate) fn range_query(
    mapper: &dyn Mapper,
    field: &str,
    lower: Option<&Value>,
    upper: Option<&Value>,
    include_lower: bool,
    include_upper: bool,
) -> Result<Query> {
    fn bound<T>(
        mapper: &dyn Mapper,
        field: &str,
        value: Option<&Value>,
        extract: fn(BaseValue) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let base = mapper.to_base(field, value)?;
        let found = base.base_type();
        extract(base)
            .map(Some)
            .ok_or_else(|| ConditionError::wrong_mapper(field, "single column", found.to_string()))
    }

    macro_rules! range {
        ($variant:ident, $extract:expr) => {
            Query::$variant(RangeQuery {
                field: field.to_string(),
                lower: bound(mapper, field, lower, $extract)?,
                upper: bound(mapper, field, upper, $extract)?,
                include_lower,
                include_upper,
            })
        };
    }

    let base_type = mapper
        .base_type()
        .ok_or_else(|| ConditionError::unsupported("range", field, mapper.kind()))?;
    let query = match base_type {
        BaseType::Text => range!(TermRange, BaseValue::into_text),
        BaseType::Int32 => range!(IntRange, BaseValue::into_i32),
        BaseType::Int64 => range!(LongRange, BaseValue::into_i64),
        BaseType::Float32 => range!(FloatRange, BaseValue::into_f32),
        BaseType::Float64 => range!(DoubleRange, BaseValue::into_f64),
    };
    Ok(query)
}

/// Phrase over analyzed tokens, collapsed when there are fewer than two.
pub(crate) fn phrase_query(field: &str, mut terms: Vec<String>, slop: u32) -> Query {
    match terms.len() {
        0 => Query::MatchNone,
        1 => Query::term(field, terms.remove(0)),
        _ => Query::Phrase(PhraseQuery {
            field: field.to_string(),
            terms,
            slop,
        }),
    }
}

/// Should-group of already compiled queries.
pub(crate) fn should_group(queries: Vec<Query>) -> Query {
    queries
        .into_iter()
        .fold(BooleanQuery::new(), BooleanQuery::should)
        .build()
}
