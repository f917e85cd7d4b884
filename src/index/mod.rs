// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory reference index.
//!
//! Rows are indexed through the [`Schema`] into [`Document`]s and compiled
//! queries are evaluated by brute force over every document. It exists to
//! exercise compiled queries end to end, not as a storage engine: there is
//! no scoring, no persistence and no term dictionary.

mod eval;

pub use eval::{matches, Matcher};

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::condition::Condition;
use crate::error::Result;
use crate::metrics;
use crate::query::Query;
use crate::schema::{FieldValue, IndexedField, Schema};
use crate::search::Search;
use crate::value::Row;

/// Indexed values of one row, grouped by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: HashMap<String, Vec<FieldValue>>,
}

impl Document {
    pub fn from_fields(fields: impl IntoIterator<Item = IndexedField>) -> Self {
        let mut document = Self::default();
        for field in fields {
            document.fields.entry(field.name).or_default().push(field.value);
        }
        document
    }

    /// Every value stored under `field`.
    pub fn values(&self, field: &str) -> &[FieldValue] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Term lists of `field`, one per indexed value.
    pub fn term_lists<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.values(field).iter().filter_map(|value| match value {
            FieldValue::Terms(terms) => Some(terms.as_slice()),
            _ => None,
        })
    }

    /// Every term of `field`, across values.
    pub fn terms<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.term_lists(field).flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Concurrent id → document map evaluated against compiled queries.
pub struct MemoryIndex {
    schema: Arc<Schema>,
    documents: DashMap<String, Document>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            documents: DashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Index `row` under `id`, replacing any previous document.
    pub fn insert(&self, id: impl Into<String>, row: &Row) -> Result<()> {
        let id = id.into();
        let document = Document::from_fields(self.schema.index_row(row)?);
        debug!(id = %id, fields = document.fields.len(), "Indexed document");
        self.documents.insert(id, document);
        metrics::set_index_documents(self.documents.len());
        Ok(())
    }

    /// Remove a document; returns whether it existed.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.documents.remove(id).is_some();
        if removed {
            metrics::set_index_documents(self.documents.len());
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.get(id).map(|r| r.value().clone())
    }

    /// Get current document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&self) {
        self.documents.clear();
        metrics::set_index_documents(0);
    }

    /// Compile `condition` and return the sorted ids of matching documents.
    #[tracing::instrument(skip(self, condition), fields(kind = condition.kind()))]
    pub fn search(&self, condition: &Condition) -> Result<Vec<String>> {
        let query = condition.compile(&self.schema)?;
        Ok(self.execute(&query))
    }

    /// Compile a scored query + filter request and run it.
    #[tracing::instrument(skip(self, search))]
    pub fn search_request(&self, search: &Search) -> Result<Vec<String>> {
        let query = search.compile(&self.schema)?;
        Ok(self.execute(&query))
    }

    /// Sorted ids of documents matching an already compiled query.
    pub fn execute(&self, query: &Query) -> Vec<String> {
        let matcher = Matcher::new(query);
        let mut hits: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| matcher.matches(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        hits.sort();

        metrics::record_search_hits(hits.len());
        debug!(query = %query, hits = hits.len(), "Executed query");
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::MatchCondition;
    use crate::value::Value;

    fn index() -> MemoryIndex {
        MemoryIndex::new(Arc::new(Schema::new().string("name").integer("age")))
    }

    fn row(name: &str, age: i64) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), Value::from(name));
        row.insert("age".into(), Value::Int(age));
        row
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = index();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_insert_get_delete() {
        let index = index();
        index.insert("1", &row("tom", 30)).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().values("age"), &[FieldValue::Int32(30)]);

        assert!(index.delete("1"));
        assert!(!index.delete("1"));
        assert!(index.get("1").is_none());
    }

    #[test]
    fn test_insert_rejects_bad_row() {
        let index = index();
        let mut bad = Row::new();
        bad.insert("age".into(), Value::from("thirty"));
        assert!(index.insert("1", &bad).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_returns_sorted_ids() {
        let index = index();
        index.insert("b", &row("tom", 30)).unwrap();
        index.insert("a", &row("tom", 40)).unwrap();
        index.insert("c", &row("ann", 30)).unwrap();

        let condition = MatchCondition::new("name", "tom").unwrap().into();
        assert_eq!(index.search(&condition).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_document_term_views() {
        let document = Document::from_fields(vec![
            IndexedField::new("tags", FieldValue::Terms(vec!["a".into(), "b".into()])),
            IndexedField::new("tags", FieldValue::Terms(vec!["c".into()])),
        ]);
        assert_eq!(document.term_lists("tags").count(), 2);
        assert_eq!(document.terms("tags").count(), 3);
        assert_eq!(document.terms("missing").count(), 0);
    }
}
