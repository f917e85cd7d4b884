// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-text query syntax condition.
//!
//! The query string is parsed with tantivy's query grammar and the resulting
//! [`UserInputAst`] is lowered into a [`Query`] through the same mapper
//! dispatch the typed conditions use.
//!
//! # Syntax
//!
//! ```text
//! tom                     - term in the default field
//! name:tom                - term in a field
//! "big data"~2            - phrase, optional slop
//! tom*                    - prefix
//! tom~1                   - fuzzy, max edits 0..=2
//! /t.m/                   - regular expression
//! age:[10 TO 20}          - range, `*` for an open end
//! +a -b c                 - required / prohibited / optional
//! a AND b, a OR b, NOT a  - conjunctions
//! (a b)^2                 - group, boost
//! *, *:*                 - every document
//! a\*b                    - backslash escapes a special character
//! ```
//!
//! Escaped characters are always literal. A single unmodified clause is
//! returned without a boolean wrapper.

use serde::{Deserialize, Serialize};
use tantivy_query_grammar::{
    parse_query, Delimiter, Occur as UserOccur, UserInputAst, UserInputBound, UserInputLeaf,
    UserInputLiteral,
};

use super::field::{check_regexp, DEFAULT_MAX_EXPANSIONS, MAX_EDITS};
use super::{check_boost, check_clauses, check_field, match_query, phrase_query, range_query};
use crate::error::{ConditionError, Result};
use crate::query::{BooleanQuery, FuzzyQuery, PrefixQuery, Query, RangeQuery, RegexpQuery};
use crate::schema::{BaseType, Schema};
use crate::value::Value;

/// Deepest group or negation nesting a query string may use.
pub const MAX_NESTING_DEPTH: usize = 32;

/// A query string in Lucene-like syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuceneCondition {
    query: String,
    /// Field for terms without one; the config's `syntax_default_field` if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl LuceneCondition {
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let condition = Self {
            query: query.into(),
            default_field: None,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Result<Self> {
        self.default_field = Some(field.into());
        self.validate()?;
        Ok(self)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ConditionError::invalid("query", "Query required"));
        }
        if let Some(field) = &self.default_field {
            check_field(field)?;
        }
        if nesting_depth(&self.query) > MAX_NESTING_DEPTH {
            return Err(syntax_error(
                &self.query,
                format!("too deeply nested, at most {} levels allowed", MAX_NESTING_DEPTH),
            ));
        }
        Ok(())
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let default_field = self
            .default_field
            .as_deref()
            .unwrap_or(&schema.config().syntax_default_field);
        let ast = parse_query(&self.query.replace("*:*", "*"))
            .map_err(|_| syntax_error(&self.query, "invalid query syntax"))?;
        Lowering {
            input: &self.query,
            schema,
            default_field,
        }
        .lower(&ast, 0)
    }
}

fn syntax_error(input: &str, reason: impl Into<String>) -> ConditionError {
    ConditionError::parse("query", input, reason)
}

/// Deepest parenthesis nesting, or longest run of `NOT`s, outside quotes.
///
/// Checked before parsing since the grammar recurses once per level.
fn nesting_depth(input: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut quoted, mut escaped) = (false, false);
    for c in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            '(' if !quoted => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut run = 0;
    for word in input.split_whitespace() {
        if word == "NOT" {
            run += 1;
            deepest = deepest.max(run);
        } else {
            run = 0;
        }
    }
    deepest
}

/// `term~` or `term~N` written as a plain word.
fn split_fuzzy(text: &str) -> Option<(&str, &str)> {
    let (term, edits) = text.rsplit_once('~')?;
    (!term.is_empty() && edits.chars().all(|c| c.is_ascii_digit())).then_some((term, edits))
}

/// `/pattern/` written as a plain word.
fn regexp_literal(text: &str) -> Option<&str> {
    text.strip_prefix('/')?.strip_suffix('/')
}

/// Turns a parsed query into a [`Query`] against one schema.
struct Lowering<'a> {
    input: &'a str,
    schema: &'a Schema,
    default_field: &'a str,
}

impl Lowering<'_> {
    fn error(&self, reason: impl Into<String>) -> ConditionError {
        syntax_error(self.input, reason)
    }

    fn field<'f>(&'f self, field: &'f Option<String>) -> &'f str {
        field.as_deref().unwrap_or(self.default_field)
    }

    fn lower(&self, ast: &UserInputAst, depth: usize) -> Result<Query> {
        if depth > 2 * MAX_NESTING_DEPTH + 2 {
            return Err(self.error("too deeply nested"));
        }
        match ast {
            UserInputAst::Clause(clauses) => self.lower_clauses(clauses, depth),
            UserInputAst::Leaf(leaf) => self.lower_leaf(leaf),
            UserInputAst::Boost(inner, boost) => {
                let query = self.lower(inner, depth + 1)?;
                Ok(query.boost(check_boost(*boost as f32)?))
            }
        }
    }

    fn lower_clauses(
        &self,
        clauses: &[(Option<UserOccur>, UserInputAst)],
        depth: usize,
    ) -> Result<Query> {
        if let [(None | Some(UserOccur::Should), only)] = clauses {
            return self.lower(only, depth + 1);
        }
        check_clauses(self.schema, clauses.len())?;

        let mut query = BooleanQuery::new();
        for (occur, ast) in clauses {
            let clause = self.lower(ast, depth + 1)?;
            query = match occur {
                Some(UserOccur::Must) => query.must(clause),
                Some(UserOccur::MustNot) => query.must_not(clause),
                Some(UserOccur::Should) | None => query.should(clause),
            };
        }
        Ok(query.build())
    }

    fn lower_leaf(&self, leaf: &UserInputLeaf) -> Result<Query> {
        match leaf {
            UserInputLeaf::All => Ok(Query::MatchAll),
            UserInputLeaf::Literal(literal) => self.lower_literal(literal),
            UserInputLeaf::Range { field, lower, upper } => {
                self.range(self.field(field), lower, upper)
            }
            _ => Err(self.error("unsupported query syntax")),
        }
    }

    fn lower_literal(&self, literal: &UserInputLiteral) -> Result<Query> {
        let field = self.field(&literal.field_name);
        let text = literal.phrase.as_str();

        if literal.prefix {
            return Ok(Query::Prefix(PrefixQuery {
                field: field.to_string(),
                prefix: self.text_term(field, text, "prefix")?,
            }));
        }
        if !matches!(literal.delimiter, Delimiter::None) {
            return self.phrase(field, text, literal.slop);
        }
        if literal.slop > 0 {
            return self.fuzzy(field, text, literal.slop);
        }
        if let Some((term, edits)) = split_fuzzy(text) {
            let max_edits = match edits {
                "" => u32::from(MAX_EDITS),
                digits => digits
                    .parse()
                    .map_err(|_| self.error(format!("invalid max edits '{}'", digits)))?,
            };
            return self.fuzzy(field, term, max_edits);
        }
        if let Some(pattern) = regexp_literal(text) {
            check_regexp(pattern)?;
            self.text_term(field, pattern, "regexp")?;
            return Ok(Query::Regexp(RegexpQuery {
                field: field.to_string(),
                pattern: pattern.to_string(),
            }));
        }

        match self.schema.mapper(field) {
            Some(mapper) => match_query(self.schema, mapper, field, &Value::Text(text.to_string())),
            None => Ok(Query::term(field, text)),
        }
    }

    fn phrase(&self, field: &str, text: &str, slop: u32) -> Result<Query> {
        match self.schema.mapper(field) {
            Some(mapper) if !mapper.is_analyzed() => {
                match_query(self.schema, mapper, field, &Value::Text(text.to_string()))
            }
            _ => Ok(phrase_query(
                field,
                self.schema.analyzer_for(field).analyze(text),
                slop,
            )),
        }
    }

    fn fuzzy(&self, field: &str, text: &str, max_edits: u32) -> Result<Query> {
        let max_edits = u8::try_from(max_edits)
            .ok()
            .filter(|edits| *edits <= MAX_EDITS)
            .ok_or_else(|| self.error(format!("max edits must be between 0 and {}", MAX_EDITS)))?;
        Ok(Query::Fuzzy(FuzzyQuery {
            field: field.to_string(),
            term: self.text_term(field, text, "fuzzy")?,
            max_edits,
            prefix_length: 0,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            transpositions: true,
        }))
    }

    fn range(&self, field: &str, lower: &UserInputBound, upper: &UserInputBound) -> Result<Query> {
        let (lower, include_lower) = bound(lower);
        let (upper, include_upper) = bound(upper);
        match self.schema.mapper(field) {
            Some(mapper) => range_query(
                mapper,
                field,
                lower.map(|s| Value::Text(s.to_string())).as_ref(),
                upper.map(|s| Value::Text(s.to_string())).as_ref(),
                include_lower,
                include_upper,
            ),
            None => Ok(Query::TermRange(RangeQuery {
                field: field.to_string(),
                lower: lower.map(str::to_string),
                upper: upper.map(str::to_string),
                include_lower,
                include_upper,
            })),
        }
    }

    /// Term for a text-only query; unknown fields keep the raw text.
    fn text_term(&self, field: &str, text: &str, condition: &'static str) -> Result<String> {
        let Some(mapper) = self.schema.mapper(field) else {
            return Ok(text.to_string());
        };
        if mapper.base_type() != Some(BaseType::Text) {
            return Err(ConditionError::unsupported(condition, field, mapper.kind()));
        }
        let term = mapper
            .to_base(field, &Value::Text(text.to_string()))?
            .into_text()
            .unwrap_or_else(|| text.to_string());
        Ok(if mapper.is_analyzed() {
            term.to_lowercase()
        } else {
            term
        })
    }
}

fn bound(bound: &UserInputBound) -> (Option<&str>, bool) {
    match bound {
        UserInputBound::Inclusive(value) if value != "*" => (Some(value.as_str()), true),
        UserInputBound::Exclusive(value) if value != "*" => (Some(value.as_str()), false),
        _ => (None, false),
    }
}
