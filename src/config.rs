// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for a search index schema.
//!
//! # Example
//!
//! ```
//! use search_conditions::IndexConfig;
//!
//! // Minimal config (uses defaults)
//! let config = IndexConfig::default();
//! assert_eq!(config.max_boolean_clauses, 1024);
//!
//! // Partial override from JSON
//! let config = IndexConfig::from_json(r#"{ "default_analyzer": "keyword" }"#).unwrap();
//! assert_eq!(config.default_analyzer, "keyword");
//! assert_eq!(config.syntax_default_field, "lucene");
//! ```

use serde::Deserialize;

/// Configuration shared by a schema and every condition compiled against it.
///
/// All fields have defaults, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexConfig {
    /// Analyzer used by text fields that don't name one (default: "standard")
    #[serde(default = "default_analyzer")]
    pub default_analyzer: String,

    /// chrono format for textual dates (default: "%Y/%m/%d %H:%M:%S%.3f %z")
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,

    /// Upper bound on clauses in a single boolean query
    #[serde(default = "default_max_boolean_clauses")]
    pub max_boolean_clauses: usize,

    /// Field used by full-text syntax terms without an explicit field
    #[serde(default = "default_syntax_field")]
    pub syntax_default_field: String,
}

fn default_analyzer() -> String { "standard".to_string() }
fn default_date_pattern() -> String { "%Y/%m/%d %H:%M:%S%.3f %z".to_string() }
fn default_max_boolean_clauses() -> usize { 1024 }
fn default_syntax_field() -> String { "lucene".to_string() }

impl IndexConfig {
    /// Parse a config from JSON, filling in defaults for absent keys.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_analyzer: default_analyzer(),
            date_pattern: default_date_pattern(),
            max_boolean_clauses: default_max_boolean_clauses(),
            syntax_default_field: default_syntax_field(),
        }
    }
}
