// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Search Conditions
//!
//! A typed condition language that compiles to a full-text search engine's
//! native query tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Condition / Search (JSON)                 │
//! │  • Closed sum type, serde-tagged by "type"                 │
//! │  • Structural validation at construction                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     compile(&Schema)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           Schema                            │
//! │  • Mappers: field type, analysis, spatial strategies       │
//! │  • Analyzers: standard, keyword, whitespace                │
//! │  • IndexConfig: date pattern, clause limit                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query (native tree)                    │
//! │  • Term, phrase, range, boolean, spatial, boost            │
//! │  • Lucene-like Display for logs                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (reference execution)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MemoryIndex                         │
//! │  • DashMap of indexed rows, brute-force evaluation         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use search_conditions::{
//!     BooleanCondition, Condition, MatchCondition, MemoryIndex, RangeCondition, Row, Schema, Value,
//! };
//!
//! let schema = Arc::new(Schema::new().string("name").integer("age"));
//! let index = MemoryIndex::new(schema.clone());
//!
//! let mut row = Row::new();
//! row.insert("name".into(), Value::from("Tom"));
//! row.insert("age".into(), Value::Int(15));
//! index.insert("1", &row).unwrap();
//!
//! let condition: Condition = BooleanCondition::new()
//!     .must(MatchCondition::new("name", "Tom").unwrap())
//!     .must(RangeCondition::new("age").unwrap().lower(10).upper(20))
//!     .into();
//!
//! assert_eq!(
//!     condition.compile(&schema).unwrap().to_string(),
//!     "+name:Tom +age:{10 TO 20}"
//! );
//! assert_eq!(index.search(&condition).unwrap(), vec!["1"]);
//! ```
//!
//! ## Configuration
//!
//! See [`IndexConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`condition`]: The [`Condition`] language and its compilation
//! - [`search`]: Scored query plus filter requests
//! - [`schema`]: Mappers and the [`Schema`] registry
//! - [`query`]: The compiled [`Query`] tree
//! - [`spatial`]: Distances, WKT shapes, strategies, transformations
//! - [`analysis`]: Text analyzers
//! - [`index`]: In-memory reference index

pub mod analysis;
pub mod condition;
pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod query;
pub mod schema;
pub mod search;
pub mod spatial;
pub mod value;

pub use condition::{
    AllCondition, BitemporalCondition, BooleanCondition, Condition, ContainsCondition,
    DateRangeCondition, DateRangeOperation, FuzzyCondition, GeoBBoxCondition,
    GeoDistanceCondition, GeoShapeCondition, LuceneCondition, MatchCondition, NoneCondition,
    PhraseCondition, PrefixCondition, RangeCondition, RegexpCondition, WildcardCondition,
};
pub use config::IndexConfig;
pub use error::{ConditionError, Result};
pub use index::{Document, MemoryIndex};
pub use query::Query;
pub use schema::Schema;
pub use search::Search;
pub use spatial::{GeoDistance, GeoTransformation, SpatialOperation};
pub use value::{Row, Value};
