// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Boolean composition of conditions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{check_clauses, Condition};
use crate::error::Result;
use crate::metrics;
use crate::query::{BooleanQuery, Query};
use crate::schema::Schema;

/// MUST / SHOULD / MUST_NOT groups of child conditions.
///
/// A condition with only `not` clauses is compiled as
/// `*:* AND NOT (...)`, since a negation alone selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanCondition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    must: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    should: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    not: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl BooleanCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, condition: impl Into<Condition>) -> Self {
        self.must.push(condition.into());
        self
    }

    pub fn should(mut self, condition: impl Into<Condition>) -> Self {
        self.should.push(condition.into());
        self
    }

    pub fn not(mut self, condition: impl Into<Condition>) -> Self {
        self.not.push(condition.into());
        self
    }

    pub fn is_pure_negation(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && !self.not.is_empty()
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let pure_negation = self.is_pure_negation();
        let clauses =
            self.must.len() + self.should.len() + self.not.len() + usize::from(pure_negation);
        check_clauses(schema, clauses)?;

        let mut query = BooleanQuery::new();
        if pure_negation {
            warn!(
                not = self.not.len(),
                "Boolean condition has only negated clauses, adding a match-all clause; \
                 this scans every document"
            );
            metrics::record_pure_negation();
            query = query.must(Query::MatchAll);
        }
        for condition in &self.must {
            query = query.must(condition.compile_boosted(schema)?);
        }
        for condition in &self.should {
            query = query.should(condition.compile_boosted(schema)?);
        }
        for condition in &self.not {
            query = query.must_not(condition.compile_boosted(schema)?);
        }
        Ok(query.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::MatchCondition;
    use crate::config::IndexConfig;
    use crate::error::ConditionError;

    fn schema() -> Schema {
        Schema::new().string("name").integer("age")
    }

    fn name(value: &str) -> MatchCondition {
        MatchCondition::new("name", value).unwrap()
    }

    #[test]
    fn test_groups_keep_order() {
        let query = BooleanCondition::new()
            .must(name("a"))
            .should(name("b"))
            .not(name("c"))
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query.to_string(), "+name:a name:b -name:c");
    }

    #[test]
    fn test_pure_negation_injects_match_all() {
        let query = BooleanCondition::new()
            .not(name("c"))
            .compile_unboosted(&schema())
            .unwrap();
        let expected = BooleanQuery::new()
            .must(Query::MatchAll)
            .must_not(Query::term("name", "c"))
            .build();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_empty_boolean_is_empty_query() {
        let condition = BooleanCondition::new();
        assert!(!condition.is_pure_negation());
        assert_eq!(
            condition.compile_unboosted(&schema()).unwrap(),
            BooleanQuery::new().build()
        );
    }

    #[test]
    fn test_children_keep_their_boost() {
        let child = Condition::from(name("a")).with_boost(3.0).unwrap();
        let query = BooleanCondition::new()
            .should(child)
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(query.to_string(), "(name:a)^3");
    }

    #[test]
    fn test_child_errors_propagate() {
        let err = BooleanCondition::new()
            .must(MatchCondition::new("nope", "x").unwrap())
            .compile_unboosted(&schema())
            .unwrap_err();
        assert_eq!(err, ConditionError::missing_field("nope"));
    }

    #[test]
    fn test_clause_limit_counts_injected_match_all() {
        let schema = Schema::with_config(IndexConfig {
            max_boolean_clauses: 1,
            ..IndexConfig::default()
        })
        .string("name");
        let condition = BooleanCondition::new().not(name("c"));
        assert!(condition.compile_unboosted(&schema).is_err());
    }
}
