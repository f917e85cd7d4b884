// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Rendering
//!
//! Renders a native [`Query`] in Lucene-like syntax.
//!
//! ```text
//! field:term                - Term
//! field:"a b"~1             - Phrase with slop
//! field:pre*                - Prefix
//! field:term~2              - Fuzzy
//! field:/re/                - Regexp
//! field:[1 TO 10}           - Range (inclusive lower, exclusive upper)
//! field:[* TO 10]           - Open range
//! +a b -c #d                - MUST / SHOULD / MUST_NOT / FILTER
//! (query)^2                 - Boost
//! *:*                       - Match all
//! ```

use std::fmt::{self, Display, Formatter};

use geo::Geometry;
use wkt::ToWkt;

use super::{BooleanQuery, Occur, Query, RangeQuery, Shape, SpatialQuery};

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Query::MatchAll => write!(f, "*:*"),
            Query::MatchNone => write!(f, "-*:*"),
            Query::Term(q) => write!(f, "{}:{}", q.field, escape_term(&q.term)),
            Query::Phrase(q) => {
                write!(f, "{}:\"{}\"", q.field, q.terms.join(" "))?;
                if q.slop > 0 {
                    write!(f, "~{}", q.slop)?;
                }
                Ok(())
            }
            Query::Prefix(q) => write!(f, "{}:{}*", q.field, escape_term(&q.prefix)),
            Query::Fuzzy(q) => write!(f, "{}:{}~{}", q.field, escape_term(&q.term), q.max_edits),
            Query::Wildcard(q) => write!(f, "{}:{}", q.field, q.pattern),
            Query::Regexp(q) => write!(f, "{}:/{}/", q.field, q.pattern),
            Query::TermRange(q) => render_range(f, q, |s| escape_term(s)),
            Query::IntRange(q) => render_range(f, q, |v| v.to_string()),
            Query::LongRange(q) => render_range(f, q, |v| v.to_string()),
            Query::FloatRange(q) => render_range(f, q, |v| v.to_string()),
            Query::DoubleRange(q) => render_range(f, q, |v| v.to_string()),
            Query::Boolean(q) => render_boolean(f, q),
            Query::Spatial(q) => render_spatial(f, q),
            Query::Boost(q) => write!(f, "({})^{}", q.query, q.boost),
        }
    }
}

fn render_range<T>(
    f: &mut Formatter<'_>,
    range: &RangeQuery<T>,
    show: impl Fn(&T) -> String,
) -> fmt::Result {
    let open = if range.include_lower { '[' } else { '{' };
    let close = if range.include_upper { ']' } else { '}' };
    let lower = range.lower.as_ref().map(&show).unwrap_or_else(|| "*".to_string());
    let upper = range.upper.as_ref().map(&show).unwrap_or_else(|| "*".to_string());
    write!(f, "{}:{}{} TO {}{}", range.field, open, lower, upper, close)
}

fn render_boolean(f: &mut Formatter<'_>, query: &BooleanQuery) -> fmt::Result {
    let parts: Vec<String> = query
        .clauses
        .iter()
        .map(|clause| {
            let marker = match clause.occur {
                Occur::Must => "+",
                Occur::Should => "",
                Occur::Filter => "#",
                Occur::MustNot => "-",
            };
            match &clause.query {
                Query::Boolean(_) => format!("{}({})", marker, clause.query),
                other => format!("{}{}", marker, other),
            }
        })
        .collect();
    if parts.is_empty() {
        write!(f, "()")
    } else {
        write!(f, "{}", parts.join(" "))
    }
}

fn render_spatial(f: &mut Formatter<'_>, query: &SpatialQuery) -> fmt::Result {
    let shape = match &query.shape {
        Shape::Rectangle(rect) => format!(
            "Rect(minX={} maxX={} minY={} maxY={})",
            rect.min().x,
            rect.max().x,
            rect.min().y,
            rect.max().y
        ),
        Shape::Circle {
            center,
            radius_degrees,
        } => format!("Circle(Pt(x={},y={}), d={})", center.x(), center.y(), radius_degrees),
        Shape::Geometry(geometry) => geometry_wkt(geometry),
    };
    write!(f, "{}:{}({})", query.field, query.operation, shape)
}

fn geometry_wkt(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

/// Escape Lucene syntax characters inside a single term.
fn escape_term(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '+' | '-' | '&' | '|' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~'
            | '*' | '?' | ':' | '\\' | '/' | ' ' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FuzzyQuery, PhraseQuery, PrefixQuery};

    #[test]
    fn test_term() {
        assert_eq!(Query::term("name", "tom").to_string(), "name:tom");
    }

    #[test]
    fn test_term_escaping() {
        assert_eq!(Query::term("email", "a:b c").to_string(), "email:a\\:b\\ c");
    }

    #[test]
    fn test_phrase_with_slop() {
        let query = Query::Phrase(PhraseQuery {
            field: "bio".into(),
            terms: vec!["big".into(), "data".into()],
            slop: 2,
        });
        assert_eq!(query.to_string(), "bio:\"big data\"~2");
    }

    #[test]
    fn test_prefix_and_fuzzy() {
        let prefix = Query::Prefix(PrefixQuery {
            field: "name".into(),
            prefix: "al".into(),
        });
        assert_eq!(prefix.to_string(), "name:al*");

        let fuzzy = Query::Fuzzy(FuzzyQuery {
            field: "name".into(),
            term: "alice".into(),
            max_edits: 1,
            prefix_length: 0,
            max_expansions: 50,
            transpositions: true,
        });
        assert_eq!(fuzzy.to_string(), "name:alice~1");
    }

    #[test]
    fn test_half_open_range() {
        let query = Query::IntRange(RangeQuery {
            field: "age".into(),
            lower: Some(10),
            upper: Some(20),
            include_lower: true,
            include_upper: false,
        });
        assert_eq!(query.to_string(), "age:[10 TO 20}");
    }

    #[test]
    fn test_unbounded_range() {
        let query = Query::LongRange(RangeQuery {
            field: "ts".into(),
            lower: None,
            upper: None,
            include_lower: false,
            include_upper: false,
        });
        assert_eq!(query.to_string(), "ts:{* TO *}");
    }

    #[test]
    fn test_nested_boolean_and_boost() {
        let inner = BooleanQuery::new()
            .should(Query::term("status", "active"))
            .should(Query::term("status", "pending"))
            .build();
        let query = BooleanQuery::new()
            .must(Query::MatchAll)
            .must_not(inner)
            .build()
            .boost(2.0);
        assert_eq!(
            query.to_string(),
            "(+*:* -(status:active status:pending))^2"
        );
    }

    #[test]
    fn test_empty_boolean() {
        assert_eq!(BooleanQuery::new().build().to_string(), "()");
    }
}
