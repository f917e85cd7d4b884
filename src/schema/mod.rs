// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index Schema
//!
//! Field name → typed mapper, plus the analyzers text fields refer to.
//! Conditions only ever see a schema through [`Schema::mapper`] and
//! [`Schema::analyzer_for`].
//!
//! # Example
//!
//! ```
//! use search_conditions::schema::{GeoPointMapper, Schema};
//!
//! let schema = Schema::new()
//!     .string("name")
//!     .text("bio")
//!     .integer("age")
//!     .add_mapper(GeoPointMapper::new("location", "lat", "lon"));
//!
//! assert_eq!(schema.mapper("age").map(|m| m.kind()), Some("integer"));
//! assert!(schema.mapper("missing").is_none());
//! ```

mod date;
mod geo_point;
mod mapper;
mod scalar;
mod temporal;

pub use date::DateParser;
pub use geo_point::{GeoPointMapper, GeoShapeMapper, DEFAULT_MAX_LEVELS};
pub use mapper::{BaseType, BaseValue, FieldValue, IndexedField, Mapper};
pub use scalar::{ScalarKind, ScalarMapper};
pub use temporal::{BitemporalMapper, DateRangeMapper, MAX_INSTANT, MIN_INSTANT};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::analysis::{Analyzer, KeywordAnalyzer, StandardAnalyzer, WhitespaceAnalyzer};
use crate::config::IndexConfig;
use crate::error::{ConditionError, Result};
use crate::value::Row;

static FALLBACK_ANALYZER: StandardAnalyzer = StandardAnalyzer;

/// Mappers and analyzers of one index.
#[derive(Debug)]
pub struct Schema {
    mappers: BTreeMap<String, Box<dyn Mapper>>,
    analyzers: HashMap<String, Arc<dyn Analyzer>>,
    config: IndexConfig,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Empty schema with the built-in analyzers registered.
    pub fn with_config(config: IndexConfig) -> Self {
        let mut analyzers: HashMap<String, Arc<dyn Analyzer>> = HashMap::new();
        analyzers.insert("standard".into(), Arc::new(StandardAnalyzer));
        analyzers.insert("keyword".into(), Arc::new(KeywordAnalyzer));
        analyzers.insert("whitespace".into(), Arc::new(WhitespaceAnalyzer));
        Self {
            mappers: BTreeMap::new(),
            analyzers,
            config,
        }
    }

    /// Add a mapper; a later mapper for the same field replaces the earlier one.
    pub fn add_mapper(mut self, mapper: impl Mapper + 'static) -> Self {
        self.mappers
            .insert(mapper.field().to_string(), Box::new(mapper));
        self
    }

    /// Add an unanalyzed, case-sensitive text field
    pub fn string(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::string(field))
    }

    /// Add a text field analyzed with the default analyzer
    pub fn text(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::text(field))
    }

    /// Add a text field analyzed with a named analyzer
    pub fn text_with(self, field: impl Into<String>, analyzer: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::new(
            field,
            ScalarKind::Text {
                analyzer: Some(analyzer.into()),
            },
        ))
    }

    pub fn integer(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::integer(field))
    }

    pub fn long(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::long(field))
    }

    pub fn float(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::float(field))
    }

    pub fn double(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::double(field))
    }

    pub fn boolean(self, field: impl Into<String>) -> Self {
        self.add_mapper(ScalarMapper::boolean(field))
    }

    /// Add a date field using the configured date pattern
    pub fn date(self, field: impl Into<String>) -> Self {
        let pattern = self.config.date_pattern.clone();
        self.add_mapper(ScalarMapper::date(field, pattern))
    }

    /// Register an analyzer under `name`.
    pub fn register_analyzer(mut self, name: impl Into<String>, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzers.insert(name.into(), analyzer);
        self
    }

    pub fn mapper(&self, field: &str) -> Option<&dyn Mapper> {
        self.mappers.get(field).map(|m| m.as_ref())
    }

    pub fn mappers(&self) -> impl Iterator<Item = &dyn Mapper> {
        self.mappers.values().map(|m| m.as_ref())
    }

    pub fn analyzer(&self, name: &str) -> Option<&dyn Analyzer> {
        self.analyzers.get(name).map(|a| a.as_ref())
    }

    /// Analyzer for `field`: the mapper's own, else the configured default.
    pub fn analyzer_for(&self, field: &str) -> &dyn Analyzer {
        self.mapper(field)
            .and_then(|m| m.analyzer())
            .and_then(|name| self.analyzer(name))
            .or_else(|| self.analyzer(&self.config.default_analyzer))
            .unwrap_or(&FALLBACK_ANALYZER)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Check that every analyzer a mapper names is registered.
    pub fn validate(&self) -> Result<()> {
        if self.analyzer(&self.config.default_analyzer).is_none() {
            return Err(ConditionError::invalid(
                "default_analyzer",
                format!("Analyzer '{}' is not registered", self.config.default_analyzer),
            ));
        }
        for mapper in self.mappers() {
            if let Some(name) = mapper.analyzer() {
                if self.analyzer(name).is_none() {
                    return Err(ConditionError::invalid(
                        "analyzer",
                        format!(
                            "Field '{}' uses analyzer '{}', which is not registered",
                            mapper.field(),
                            name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Index every mapped column of `row`.
    pub fn index_row(&self, row: &Row) -> Result<Vec<IndexedField>> {
        let mut fields = Vec::new();
        for mapper in self.mappers() {
            let analyzer = self.analyzer_for(mapper.field());
            fields.extend(mapper.index(row, analyzer)?);
        }
        debug!(fields = fields.len(), "Indexed row");
        Ok(fields)
    }
}
