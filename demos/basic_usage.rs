// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic search-conditions usage example.
//!
//! Demonstrates:
//! 1. Declaring a schema of field mappers
//! 2. Indexing a handful of rows into the in-memory index
//! 3. Building conditions in code and from JSON
//! 4. Rendering compiled queries and running them
//! 5. Displaying metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;
use std::time::Instant;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use search_conditions::schema::{BitemporalMapper, GeoPointMapper};
use search_conditions::{
    BitemporalCondition, BooleanCondition, Condition, GeoDistanceCondition,
    LuceneCondition, MatchCondition, MemoryIndex, RangeCondition, Row, Schema, Search, Value,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           search-conditions: Basic Usage Example              ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Declare the schema
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Declaring schema...");
    let schema = Arc::new(
        Schema::new()
            .string("name")
            .integer("age")
            .text("bio")
            .add_mapper(GeoPointMapper::new("place", "lat", "lon"))
            .add_mapper(
                BitemporalMapper::new("history", "vt_from", "vt_to", "tt_from", "tt_to", "%Y/%m/%d")
                    .now_value("2200/01/01"),
            ),
    );
    for mapper in schema.mappers() {
        println!("   └─ {} ({})", mapper.field(), mapper.kind());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Index rows
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Indexing 4 rows...");
    let rows: Vec<(&str, Vec<(&str, Value)>)> = vec![
        ("alice", vec![
            ("name", "Alice".into()), ("age", 34.into()), ("bio", "Runs the Madrid office".into()),
            ("lat", 40.42.into()), ("lon", (-3.70).into()),
            ("vt_from", "2020/01/01".into()), ("vt_to", "2200/01/01".into()),
            ("tt_from", "2020/01/01".into()), ("tt_to", "2200/01/01".into()),
        ]),
        ("bob", vec![
            ("name", "Bob".into()), ("age", 19.into()), ("bio", "Intern in the Paris office".into()),
            ("lat", 48.86.into()), ("lon", 2.35.into()),
            ("vt_from", "2021/06/01".into()), ("vt_to", "2021/09/01".into()),
            ("tt_from", "2021/06/01".into()), ("tt_to", "2200/01/01".into()),
        ]),
        ("carol", vec![
            ("name", "Carol".into()), ("age", 52.into()), ("bio", "Heads the London office".into()),
            ("lat", 51.51.into()), ("lon", (-0.13).into()),
        ]),
        ("dave", vec![("name", "Dave".into()), ("age", 27.into())]),
    ];

    let index = MemoryIndex::new(schema.clone());
    for (id, columns) in &rows {
        let row: Row = columns.iter().map(|(c, v)| (c.to_string(), v.clone())).collect();
        index.insert(*id, &row)?;
        println!("   └─ Indexed: {}", id);
    }
    println!("   ✅ {} documents", index.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Build and run conditions
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔍 Running conditions...");
    let conditions: Vec<(&str, Condition)> = vec![
        ("exact name", MatchCondition::new("name", "Alice")?.into()),
        ("adults under 40", RangeCondition::new("age")?.lower(18).upper(40).include_lower(true).into()),
        ("full-text", MatchCondition::new("bio", "the office")?.into()),
        (
            "within 600km of Madrid",
            GeoDistanceCondition::new("place", 40.42, -3.70, "600km".parse()?)?.into(),
        ),
        (
            "valid in summer 2021",
            BitemporalCondition::new("history")?.vt_from("2021/07/01").vt_to("2021/07/31").into(),
        ),
        (
            "not an intern",
            BooleanCondition::new().not(MatchCondition::new("bio", "intern")?).into(),
        ),
        ("query syntax", LuceneCondition::new("name:Carol OR age:[30 TO *]")?.into()),
    ];

    for (label, condition) in &conditions {
        let start = Instant::now();
        let query = condition.compile(&schema)?;
        let hits = index.execute(&query);
        println!("   └─ {}: {}", label, query);
        println!("      → {:?} ({:?})", hits, start.elapsed());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. JSON requests
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📨 Running a JSON search request...");
    let request: Search = serde_json::from_str(
        r#"{
            "query": [{"type": "match", "field": "bio", "value": "office", "boost": 2.0}],
            "filter": [{"type": "geo_distance", "field": "place",
                        "latitude": 48.86, "longitude": 2.35, "max_distance": "1000km"}]
        }"#,
    )?;
    println!("   └─ {}", request.compile(&schema)?);
    println!("      → {:?}", index.search_request(&request)?);

    let invalid = Condition::from(MatchCondition::new("salary", 100)?);
    match index.search(&invalid) {
        Ok(hits) => println!("   └─ Unexpected hits: {:?}", hits),
        Err(e) => println!("   └─ Rejected as expected: {}", e),
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Dump metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Metrics:");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Example complete!                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

/// Dump all captured metrics grouped by kind
fn dump_metrics(snapshotter: &Snapshotter) {
    let mut counters = Vec::new();
    let mut gauges = Vec::new();
    let mut histograms = Vec::new();

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let key = composite_key.key();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };
        let name = format!("{}{}", key.name(), label_str);

        match value {
            DebugValue::Counter(v) => counters.push((name, v)),
            DebugValue::Gauge(v) => gauges.push((name, v.into_inner())),
            DebugValue::Histogram(samples) => {
                let count = samples.len();
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                histograms.push((name, count, sum));
            }
        }
    }

    counters.sort();
    gauges.sort_by(|a, b| a.0.cmp(&b.0));
    histograms.sort_by(|a, b| a.0.cmp(&b.0));

    if !counters.is_empty() {
        println!("   ┌─ Counters (cumulative)");
        for (name, value) in &counters {
            println!("   │  └─ {} = {}", name, value);
        }
    }
    if !gauges.is_empty() {
        println!("   ├─ Gauges (current value)");
        for (name, value) in &gauges {
            println!("   │  └─ {} = {:.0}", name, value);
        }
    }
    if !histograms.is_empty() {
        println!("   └─ Histograms (distributions)");
        for (name, count, sum) in &histograms {
            let avg = if *count > 0 { sum / *count as f64 } else { 0.0 };
            println!("      └─ {} count={} sum={:.6} avg={:.6}", name, count, sum, avg);
        }
    }
}
