// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Spatial strategies: mapper-provided builders of spatial predicates.

use super::SpatialOperation;
use crate::query::{Query, Shape, SpatialQuery};

/// How a spatial field is indexed, which decides how it can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Raw point coordinates, suited to distance checks
    PointVector,
    /// Bounding boxes, suited to rectangle checks
    BBox,
    /// Grid cells up to `max_levels`, suited to arbitrary shapes
    PrefixTree { max_levels: u8 },
}

/// Turns a shape plus an operation into a native spatial query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialStrategy {
    field: String,
    kind: StrategyKind,
}

impl SpatialStrategy {
    pub fn new(field: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn make_query(
        &self,
        operation: SpatialOperation,
        shape: Shape,
        distance_error_pct: f64,
    ) -> Query {
        Query::Spatial(SpatialQuery {
            field: self.field.clone(),
            strategy: self.kind,
            operation,
            shape,
            distance_error_pct,
        })
    }
}
