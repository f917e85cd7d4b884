// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Native Query Tree
//!
//! The predicate representation handed to the search engine. Conditions
//! compile into this tree; nothing in this module interprets a condition.
//!
//! # Shape
//!
//! ```text
//! Boost(2.0)
//!   └─ Boolean
//!        ├─ MUST      Term(name:tom)
//!        ├─ SHOULD    IntRange(age:[10 TO 20})
//!        ├─ FILTER    Spatial(location Intersects Rect)
//!        └─ MUST_NOT  MatchAll
//! ```
//!
//! Rendering ([`std::fmt::Display`]) uses Lucene-like syntax and is meant for
//! logs and diagnostics, not for re-parsing.

mod render;

use geo::{Geometry, Point, Rect};

use crate::spatial::{SpatialOperation, StrategyKind};

/// Native predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches every document
    MatchAll,
    /// Matches no document
    MatchNone,
    /// Exact term: field:term
    Term(TermQuery),
    /// Ordered terms within `slop` positions: field:"a b"~slop
    Phrase(PhraseQuery),
    /// Term prefix: field:pre*
    Prefix(PrefixQuery),
    /// Edit-distance term match: field:term~2
    Fuzzy(FuzzyQuery),
    /// `*` / `?` term pattern
    Wildcard(WildcardQuery),
    /// Regular expression over whole terms: field:/re/
    Regexp(RegexpQuery),
    /// Lexicographic term interval
    TermRange(RangeQuery<String>),
    /// 32-bit integer interval
    IntRange(RangeQuery<i32>),
    /// 64-bit integer interval
    LongRange(RangeQuery<i64>),
    /// Single-precision interval
    FloatRange(RangeQuery<f32>),
    /// Double-precision interval
    DoubleRange(RangeQuery<f64>),
    /// Clause composition
    Boolean(BooleanQuery),
    /// Shape predicate built by a spatial strategy
    Spatial(SpatialQuery),
    /// Score multiplier around another query
    Boost(BoostQuery),
}

impl Query {
    pub fn term(field: impl Into<String>, term: impl Into<String>) -> Self {
        Query::Term(TermQuery {
            field: field.into(),
            term: term.into(),
        })
    }

    /// Wrap in a boost.
    pub fn boost(self, boost: f32) -> Self {
        Query::Boost(BoostQuery {
            query: Box::new(self),
            boost,
        })
    }

    /// Effective boost of the outermost node (1.0 when unwrapped).
    pub fn boost_value(&self) -> f32 {
        match self {
            Query::Boost(b) => b.boost,
            _ => 1.0,
        }
    }

    /// The query without its outermost boost wrapper.
    pub fn unboosted(&self) -> &Query {
        match self {
            Query::Boost(b) => &b.query,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    pub field: String,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    pub field: String,
    pub terms: Vec<String>,
    pub slop: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixQuery {
    pub field: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyQuery {
    pub field: String,
    pub term: String,
    pub max_edits: u8,
    pub prefix_length: u32,
    pub max_expansions: u32,
    /// Count an adjacent swap as one edit (Damerau-Levenshtein)
    pub transpositions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardQuery {
    pub field: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexpQuery {
    pub field: String,
    pub pattern: String,
}

/// Interval over one field; `None` bounds are open.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery<T> {
    pub field: String,
    pub lower: Option<T>,
    pub upper: Option<T>,
    pub include_lower: bool,
    pub include_upper: bool,
}

impl<T: PartialOrd> RangeQuery<T> {
    /// Inclusive on both ends.
    pub fn closed(field: impl Into<String>, lower: T, upper: T) -> Self {
        Self {
            field: field.into(),
            lower: Some(lower),
            upper: Some(upper),
            include_lower: true,
            include_upper: true,
        }
    }

    /// Whether `value` falls inside the interval.
    pub fn contains(&self, value: &T) -> bool {
        let above = match &self.lower {
            None => true,
            Some(lower) if self.include_lower => value >= lower,
            Some(lower) => value > lower,
        };
        let below = match &self.upper {
            None => true,
            Some(upper) if self.include_upper => value <= upper,
            Some(upper) => value < upper,
        };
        above && below
    }
}

/// Role of a clause inside a boolean query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// Required and scored
    Must,
    /// Optional, scored; at least one must match when nothing is required
    Should,
    /// Required, not scored
    Filter,
    /// Excluded
    MustNot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub occur: Occur,
    pub query: Query,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanQuery {
    pub clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, occur: Occur, query: Query) -> Self {
        self.clauses.push(BooleanClause { occur, query });
        self
    }

    pub fn must(self, query: Query) -> Self {
        self.add(Occur::Must, query)
    }

    pub fn should(self, query: Query) -> Self {
        self.add(Occur::Should, query)
    }

    pub fn filter(self, query: Query) -> Self {
        self.add(Occur::Filter, query)
    }

    pub fn must_not(self, query: Query) -> Self {
        self.add(Occur::MustNot, query)
    }

    pub fn clauses_with(&self, occur: Occur) -> impl Iterator<Item = &Query> {
        self.clauses
            .iter()
            .filter(move |c| c.occur == occur)
            .map(|c| &c.query)
    }

    pub fn build(self) -> Query {
        Query::Boolean(self)
    }
}

/// Geometry argument of a spatial predicate, in degrees (x = lon, y = lat)
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(Rect<f64>),
    /// Great-circle disc; radius is a central angle in degrees
    Circle { center: Point<f64>, radius_degrees: f64 },
    Geometry(Geometry<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    pub field: String,
    pub strategy: StrategyKind,
    pub operation: SpatialOperation,
    pub shape: Shape,
    /// Tolerated approximation as a fraction of shape size; 0 is exact
    pub distance_error_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoostQuery {
    pub query: Box<Query>,
    pub boost: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_respects_flags() {
        let range = RangeQuery {
            field: "age".to_string(),
            lower: Some(10),
            upper: Some(20),
            include_lower: true,
            include_upper: false,
        };
        assert!(range.contains(&10));
        assert!(range.contains(&19));
        assert!(!range.contains(&20));
        assert!(!range.contains(&9));
    }

    #[test]
    fn test_open_range_contains_everything() {
        let range: RangeQuery<f64> = RangeQuery {
            field: "score".to_string(),
            lower: None,
            upper: None,
            include_lower: false,
            include_upper: false,
        };
        assert!(range.contains(&f64::MIN));
        assert!(range.contains(&f64::MAX));
    }

    #[test]
    fn test_boolean_builder_keeps_order() {
        let query = BooleanQuery::new()
            .must(Query::term("a", "1"))
            .should(Query::term("b", "2"))
            .must_not(Query::MatchAll);

        assert_eq!(query.clauses.len(), 3);
        assert_eq!(query.clauses[0].occur, Occur::Must);
        assert_eq!(query.clauses_with(Occur::Should).count(), 1);
    }

    #[test]
    fn test_boost_unwraps() {
        let query = Query::term("name", "tom").boost(2.5);
        assert_eq!(query.boost_value(), 2.5);
        assert_eq!(query.unboosted(), &Query::term("name", "tom"));
        assert_eq!(Query::MatchAll.boost_value(), 1.0);
    }
}
