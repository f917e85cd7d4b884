// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Top-level search request: scored query conditions plus unscored filters.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::condition::{check_clauses, Condition};
use crate::error::Result;
use crate::metrics;
use crate::query::{BooleanQuery, Query};
use crate::schema::Schema;

/// A search request as received from callers.
///
/// `query` conditions contribute to relevance and become MUST clauses;
/// `filter` conditions only restrict the result set and become FILTER
/// clauses. An empty request matches every document.
///
/// ```
/// use search_conditions::{MatchCondition, RangeCondition, Schema, Search};
///
/// let schema = Schema::new().string("name").integer("age");
/// let search = Search::new()
///     .query(MatchCondition::new("name", "tom").unwrap())
///     .filter(RangeCondition::new("age").unwrap().lower(18).include_lower(true));
///
/// assert_eq!(search.compile(&schema).unwrap().to_string(), "+name:tom #age:[18 TO *}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    query: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filter: Vec<Condition>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, condition: impl Into<Condition>) -> Self {
        self.query.push(condition.into());
        self
    }

    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.filter.push(condition.into());
        self
    }

    pub fn query_conditions(&self) -> &[Condition] {
        &self.query
    }

    pub fn filter_conditions(&self) -> &[Condition] {
        &self.filter
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.filter.is_empty()
    }

    #[tracing::instrument(skip(self, schema), fields(query = self.query.len(), filter = self.filter.len()))]
    pub fn compile(&self, schema: &Schema) -> Result<Query> {
        let start = Instant::now();
        match self.compile_clauses(schema) {
            Ok(query) => {
                metrics::record_compile("search", "success");
                metrics::record_compile_latency("search", start.elapsed());
                debug!(query = %query, "Compiled search");
                Ok(query)
            }
            Err(e) => {
                metrics::record_compile("search", "error");
                metrics::record_error("search", e.kind());
                debug!(error = %e, "Search compilation failed");
                Err(e)
            }
        }
    }

    fn compile_clauses(&self, schema: &Schema) -> Result<Query> {
        if self.is_empty() {
            return Ok(Query::MatchAll);
        }
        check_clauses(schema, self.query.len() + self.filter.len())?;

        let mut query = BooleanQuery::new();
        for condition in &self.query {
            query = query.must(condition.compile_boosted(schema)?);
        }
        for condition in &self.filter {
            query = query.filter(condition.compile_boosted(schema)?);
        }
        Ok(query.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{BooleanCondition, MatchCondition};
    use crate::config::IndexConfig;
    use crate::error::ConditionError;

    fn schema() -> Schema {
        Schema::new().string("name").integer("age")
    }

    fn name(value: &str) -> MatchCondition {
        MatchCondition::new("name", value).unwrap()
    }

    #[test]
    fn test_empty_search_matches_all() {
        let search = Search::new();
        assert!(search.is_empty());
        assert_eq!(search.compile(&schema()).unwrap(), Query::MatchAll);
    }

    #[test]
    fn test_query_is_must_filter_is_filter() {
        let query = Search::new()
            .query(name("a"))
            .filter(name("b"))
            .compile(&schema())
            .unwrap();
        let expected = BooleanQuery::new()
            .must(Query::term("name", "a"))
            .filter(Query::term("name", "b"))
            .build();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_filter_only_search() {
        let query = Search::new().filter(name("b")).compile(&schema()).unwrap();
        assert_eq!(query.to_string(), "#name:b");
    }

    #[test]
    fn test_nested_errors_propagate() {
        let err = Search::new()
            .filter(BooleanCondition::new().must(MatchCondition::new("nope", "x").unwrap()))
            .compile(&schema())
            .unwrap_err();
        assert_eq!(err, ConditionError::missing_field("nope"));
    }

    #[test]
    fn test_clause_limit() {
        let schema = Schema::with_config(IndexConfig {
            max_boolean_clauses: 1,
            ..IndexConfig::default()
        })
        .string("name");
        let search = Search::new().query(name("a")).filter(name("b"));
        assert!(search.compile(&schema).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = r#"{
            "query": [{"type": "match", "field": "name", "value": "tom"}],
            "filter": [{"type": "range", "field": "age", "lower": 18, "include_lower": true}]
        }"#;
        let search: Search = serde_json::from_str(json).unwrap();
        assert_eq!(search.query_conditions().len(), 1);
        assert_eq!(search.filter_conditions().len(), 1);
        assert_eq!(
            search.compile(&schema()).unwrap().to_string(),
            "+name:tom #age:[18 TO *}"
        );
    }
}
