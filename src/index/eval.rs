// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Brute-force evaluation of a compiled [`Query`] against one [`Document`].

use std::collections::HashMap;
use std::f64::consts::TAU;

use geo::{coord, Geometry, LineString, Point, Polygon, Relate};
use regex::Regex;

use super::Document;
use crate::query::{BooleanQuery, FuzzyQuery, Occur, Query, Shape, SpatialQuery};
use crate::schema::FieldValue;
use crate::spatial::SpatialOperation;

/// Vertices used to approximate a circle as a polygon.
const CIRCLE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PatternKind {
    Wildcard,
    Regexp,
}

/// A query with its wildcard and regular-expression patterns compiled once,
/// ready to be evaluated against any number of documents.
///
/// Boosts only affect scoring and are ignored here. An invalid pattern
/// matches nothing.
#[derive(Debug)]
pub struct Matcher<'q> {
    query: &'q Query,
    patterns: HashMap<(PatternKind, &'q str), Option<Regex>>,
}

impl<'q> Matcher<'q> {
    pub fn new(query: &'q Query) -> Self {
        let mut matcher = Self {
            query,
            patterns: HashMap::new(),
        };
        matcher.compile_patterns(query);
        matcher
    }

    /// Whether `document` satisfies the query.
    pub fn matches(&self, document: &Document) -> bool {
        self.eval(self.query, document)
    }

    fn compile_patterns(&mut self, query: &'q Query) {
        match query {
            Query::Wildcard(q) => {
                self.patterns
                    .entry((PatternKind::Wildcard, q.pattern.as_str()))
                    .or_insert_with(|| Regex::new(&wildcard_regex(&q.pattern)).ok());
            }
            Query::Regexp(q) => {
                self.patterns
                    .entry((PatternKind::Regexp, q.pattern.as_str()))
                    .or_insert_with(|| Regex::new(&format!("^(?:{})$", q.pattern)).ok());
            }
            Query::Boolean(q) => {
                for clause in &q.clauses {
                    self.compile_patterns(&clause.query);
                }
            }
            Query::Boost(q) => self.compile_patterns(&q.query),
            _ => {}
        }
    }

    fn pattern_matches(&self, kind: PatternKind, pattern: &'q str, field: &str, document: &Document) -> bool {
        match self.patterns.get(&(kind, pattern)) {
            Some(Some(regex)) => document.terms(field).any(|t| regex.is_match(t)),
            _ => false,
        }
    }

    fn eval(&self, query: &'q Query, document: &Document) -> bool {
        match query {
            Query::MatchAll => true,
            Query::MatchNone => false,
            Query::Term(q) => document.terms(&q.field).any(|t| *t == q.term),
            Query::Phrase(q) => document
                .term_lists(&q.field)
                .any(|terms| phrase_matches(terms, &q.terms, q.slop)),
            Query::Prefix(q) => document.terms(&q.field).any(|t| t.starts_with(&q.prefix)),
            Query::Fuzzy(q) => document.terms(&q.field).any(|t| fuzzy_matches(q, t)),
            Query::Wildcard(q) => self.pattern_matches(PatternKind::Wildcard, &q.pattern, &q.field, document),
            Query::Regexp(q) => self.pattern_matches(PatternKind::Regexp, &q.pattern, &q.field, document),
            Query::TermRange(q) => document.terms(&q.field).any(|t| q.contains(t)),
            Query::IntRange(q) => document
                .values(&q.field)
                .iter()
                .any(|v| matches!(v, FieldValue::Int32(n) if q.contains(n))),
            Query::LongRange(q) => document
                .values(&q.field)
                .iter()
                .any(|v| matches!(v, FieldValue::Int64(n) if q.contains(n))),
            Query::FloatRange(q) => document
                .values(&q.field)
                .iter()
                .any(|v| matches!(v, FieldValue::Float32(n) if q.contains(n))),
            Query::DoubleRange(q) => document
                .values(&q.field)
                .iter()
                .any(|v| matches!(v, FieldValue::Float64(n) if q.contains(n))),
            Query::Boolean(q) => self.boolean_matches(q, document),
            Query::Spatial(q) => document
                .values(&q.field)
                .iter()
                .any(|v| matches!(v, FieldValue::Shape(g) if spatial_matches(q, g))),
            Query::Boost(q) => self.eval(&q.query, document),
        }
    }

    /// MUST and FILTER clauses are required and MUST_NOT clauses excluded.
    /// Without a required clause at least one SHOULD clause has to match, so
    /// an empty query or one made only of exclusions matches nothing.
    fn boolean_matches(&self, query: &'q BooleanQuery, document: &Document) -> bool {
        let mut required = false;
        for clause in &query.clauses {
            match clause.occur {
                Occur::Must | Occur::Filter => {
                    required = true;
                    if !self.eval(&clause.query, document) {
                        return false;
                    }
                }
                Occur::MustNot => {
                    if self.eval(&clause.query, document) {
                        return false;
                    }
                }
                Occur::Should => {}
            }
        }
        required || query.clauses_with(Occur::Should).any(|q| self.eval(q, document))
    }
}

/// Whether `document` satisfies `query`.
///
/// Compiles the query's patterns on every call; use a [`Matcher`] to
/// evaluate one query against many documents.
pub fn matches(query: &Query, document: &Document) -> bool {
    Matcher::new(query).matches(document)
}

/// Ordered phrase match where `slop` extra positions may separate the terms.
fn phrase_matches(stored: &[String], phrase: &[String], slop: u32) -> bool {
    let Some((first, rest)) = phrase.split_first() else {
        return false;
    };
    stored
        .iter()
        .enumerate()
        .filter(|(_, term)| *term == first)
        .any(|(start, _)| {
            let mut last = start;
            for term in rest {
                match stored[last + 1..].iter().position(|t| t == term) {
                    Some(offset) => last += 1 + offset,
                    None => return false,
                }
            }
            last - start - rest.len() <= slop as usize
        })
}

/// `max_expansions` bounds term-dictionary expansion and has no effect on a
/// single candidate.
fn fuzzy_matches(query: &FuzzyQuery, candidate: &str) -> bool {
    let prefix = query.prefix_length as usize;
    if !candidate.chars().take(prefix).eq(query.term.chars().take(prefix)) {
        return false;
    }
    let distance = if query.transpositions {
        strsim::osa_distance(&query.term, candidate)
    } else {
        strsim::levenshtein(&query.term, candidate)
    };
    distance <= usize::from(query.max_edits)
}

fn wildcard_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    regex
}

fn spatial_matches(query: &SpatialQuery, indexed: &Geometry<f64>) -> bool {
    if let (Shape::Circle { center, radius_degrees }, Geometry::Point(point)) = (&query.shape, indexed) {
        let inside = central_angle(*center, *point) <= *radius_degrees;
        return match query.operation {
            SpatialOperation::Intersects | SpatialOperation::IsWithin => inside,
            SpatialOperation::Contains => *radius_degrees == 0.0 && inside,
            SpatialOperation::IsDisjointTo => !inside,
        };
    }

    let shape = match &query.shape {
        Shape::Rectangle(rect) => Geometry::Rect(*rect),
        Shape::Circle { center, radius_degrees } => Geometry::Polygon(circle_polygon(*center, *radius_degrees)),
        Shape::Geometry(geometry) => geometry.clone(),
    };
    let matrix = indexed.relate(&shape);
    match query.operation {
        SpatialOperation::Intersects => matrix.is_intersects(),
        SpatialOperation::IsWithin => matrix.is_within(),
        SpatialOperation::Contains => matrix.is_contains(),
        SpatialOperation::IsDisjointTo => matrix.is_disjoint(),
    }
}

/// Great-circle angle between two points, in degrees (haversine).
fn central_angle(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.x() - a.x()).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    (2.0 * h.sqrt().min(1.0).asin()).to_degrees()
}

fn circle_polygon(center: Point<f64>, radius: f64) -> Polygon<f64> {
    let lon_scale = center.y().to_radians().cos().max(1e-6);
    let ring: Vec<_> = (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let theta = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            coord! {
                x: center.x() + radius * theta.cos() / lon_scale,
                y: center.y() + radius * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FuzzyQuery, PhraseQuery, RangeQuery, RegexpQuery, WildcardQuery};
    use crate::schema::IndexedField;
    use crate::spatial::StrategyKind;
    use geo::Rect;

    fn terms(field: &str, terms: &[&str]) -> IndexedField {
        IndexedField::new(field, FieldValue::Terms(terms.iter().map(|t| t.to_string()).collect()))
    }

    fn document() -> Document {
        Document::from_fields(vec![
            terms("name", &["tom"]),
            terms("body", &["the", "quick", "brown", "fox"]),
            IndexedField::new("age", FieldValue::Int32(15)),
            IndexedField::new("place", FieldValue::Shape(Geometry::Point(Point::new(-3.5, 40.5)))),
        ])
    }

    fn spatial(operation: SpatialOperation, shape: Shape) -> Query {
        Query::Spatial(SpatialQuery {
            field: "place".into(),
            strategy: StrategyKind::BBox,
            operation,
            shape,
            distance_error_pct: 0.0,
        })
    }

    #[test]
    fn test_term_and_match_all() {
        let doc = document();
        assert!(matches(&Query::MatchAll, &doc));
        assert!(!matches(&Query::MatchNone, &doc));
        assert!(matches(&Query::term("name", "tom"), &doc));
        assert!(!matches(&Query::term("name", "Tom"), &doc));
        assert!(!matches(&Query::term("missing", "tom"), &doc));
    }

    #[test]
    fn test_boolean_semantics() {
        let doc = document();
        assert!(!matches(&BooleanQuery::new().build(), &doc));

        let negation_only = BooleanQuery::new().must_not(Query::term("name", "ann")).build();
        assert!(!matches(&negation_only, &doc));

        let with_all = BooleanQuery::new()
            .must(Query::MatchAll)
            .must_not(Query::term("name", "ann"))
            .build();
        assert!(matches(&with_all, &doc));

        let should = BooleanQuery::new()
            .should(Query::term("name", "ann"))
            .should(Query::term("name", "tom"))
            .build();
        assert!(matches(&should, &doc));

        let optional_should = BooleanQuery::new()
            .filter(Query::term("name", "tom"))
            .should(Query::term("name", "ann"))
            .build();
        assert!(matches(&optional_should, &doc));
    }

    #[test]
    fn test_boost_is_transparent() {
        let doc = document();
        assert!(matches(&Query::term("name", "tom").boost(4.0), &doc));
        assert!(!matches(&Query::term("name", "ann").boost(4.0), &doc));
    }

    #[test]
    fn test_phrase_with_slop() {
        let doc = document();
        let phrase = |terms: &[&str], slop| Query::Phrase(PhraseQuery {
            field: "body".into(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            slop,
        });
        assert!(matches(&phrase(&["quick", "brown"], 0), &doc));
        assert!(!matches(&phrase(&["quick", "fox"], 0), &doc));
        assert!(matches(&phrase(&["quick", "fox"], 1), &doc));
        assert!(!matches(&phrase(&["fox", "quick"], 5), &doc));
    }

    #[test]
    fn test_fuzzy_prefix_and_transpositions() {
        let doc = document();
        let fuzzy = |term: &str, max_edits, prefix_length, transpositions| Query::Fuzzy(FuzzyQuery {
            field: "name".into(),
            term: term.into(),
            max_edits,
            prefix_length,
            max_expansions: 50,
            transpositions,
        });
        assert!(matches(&fuzzy("tim", 1, 0, true), &doc));
        assert!(!matches(&fuzzy("tim", 0, 0, true), &doc));
        assert!(!matches(&fuzzy("xom", 2, 1, true), &doc));
        assert!(matches(&fuzzy("otm", 1, 0, true), &doc));
        assert!(!matches(&fuzzy("otm", 1, 0, false), &doc));
    }

    #[test]
    fn test_wildcard_and_regexp_are_anchored() {
        let doc = document();
        let wildcard = |pattern: &str| Query::Wildcard(WildcardQuery {
            field: "name".into(),
            pattern: pattern.into(),
        });
        assert!(matches(&wildcard("t?m"), &doc));
        assert!(matches(&wildcard("t*"), &doc));
        assert!(!matches(&wildcard("o*"), &doc));
        assert!(!matches(&wildcard("t.m"), &doc));

        let regexp = Query::Regexp(RegexpQuery {
            field: "name".into(),
            pattern: "t[aeiou]m".into(),
        });
        assert!(matches(&regexp, &doc));
    }

    #[test]
    fn test_matcher_compiles_each_pattern_once() {
        let wildcard = |pattern: &str| Query::Wildcard(WildcardQuery {
            field: "name".into(),
            pattern: pattern.into(),
        });
        let query = BooleanQuery::new()
            .should(wildcard("t*"))
            .should(wildcard("t*").boost(2.0))
            .should(Query::Regexp(RegexpQuery {
                field: "name".into(),
                pattern: "t*".into(),
            }))
            .must_not(wildcard("x?"))
            .build();

        let matcher = Matcher::new(&query);
        assert_eq!(matcher.patterns.len(), 3);
        assert!(matcher.matches(&document()));
        assert!(!matcher.matches(&Document::default()));
    }

    #[test]
    fn test_invalid_regexp_matches_nothing() {
        let regexp = Query::Regexp(RegexpQuery {
            field: "name".into(),
            pattern: "(unclosed".into(),
        });
        assert!(!matches(&regexp, &document()));
    }

    #[test]
    fn test_typed_ranges() {
        let doc = document();
        let range = |lower, upper, include_upper| Query::IntRange(RangeQuery {
            field: "age".into(),
            lower,
            upper,
            include_lower: true,
            include_upper,
        });
        assert!(matches(&range(Some(10), Some(20), false), &doc));
        assert!(matches(&range(Some(15), None, false), &doc));
        assert!(!matches(&range(Some(10), Some(15), false), &doc));
        assert!(matches(&range(Some(10), Some(15), true), &doc));

        let wrong_type = Query::LongRange(RangeQuery::closed("age", 0, 100));
        assert!(!matches(&wrong_type, &doc));
    }

    #[test]
    fn test_spatial_rectangle() {
        let doc = document();
        let inside = Rect::new(coord! { x: -4.0, y: 40.0 }, coord! { x: -3.0, y: 41.0 });
        let outside = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });

        assert!(matches(&spatial(SpatialOperation::Intersects, Shape::Rectangle(inside)), &doc));
        assert!(matches(&spatial(SpatialOperation::IsWithin, Shape::Rectangle(inside)), &doc));
        assert!(!matches(&spatial(SpatialOperation::Intersects, Shape::Rectangle(outside)), &doc));
        assert!(matches(&spatial(SpatialOperation::IsDisjointTo, Shape::Rectangle(outside)), &doc));
    }

    #[test]
    fn test_spatial_circle_uses_great_circle_angle() {
        let doc = document();
        let circle = |radius_degrees| Shape::Circle {
            center: Point::new(-3.5, 41.0),
            radius_degrees,
        };
        assert!(matches(&spatial(SpatialOperation::Intersects, circle(0.6)), &doc));
        assert!(!matches(&spatial(SpatialOperation::Intersects, circle(0.4)), &doc));
        assert!(matches(&spatial(SpatialOperation::IsDisjointTo, circle(0.4)), &doc));
    }

    #[test]
    fn test_central_angle() {
        let angle = central_angle(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!((angle - 1.0).abs() < 1e-9);
        let angle = central_angle(Point::new(0.0, 0.0), Point::new(90.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }
}
