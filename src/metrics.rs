// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for condition compilation.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding service is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `search_conditions_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: condition kind (match, range, geo_shape, ...)
//! - `status`: success, error
//! - `error_type`: see [`ConditionError::kind`](crate::ConditionError::kind)

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one root-level compilation
pub fn record_compile(kind: &str, status: &str) {
    counter!(
        "search_conditions_compile_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record root-level compilation latency
pub fn record_compile_latency(kind: &str, duration: Duration) {
    histogram!(
        "search_conditions_compile_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a categorized compilation error
pub fn record_error(kind: &str, error_type: &str) {
    counter!(
        "search_conditions_errors_total",
        "kind" => kind.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a boolean rewritten from pure negation to match-all AND NOT
pub fn record_pure_negation() {
    counter!("search_conditions_pure_negation_total").increment(1);
}

/// Set the number of documents held by the in-memory index
pub fn set_index_documents(count: usize) {
    gauge!("search_conditions_index_documents").set(count as f64);
}

/// Record the hit count of one in-memory search
pub fn record_search_hits(hits: usize) {
    histogram!("search_conditions_search_hits").record(hits as f64);
}
