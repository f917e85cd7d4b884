// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Shape-to-shape transformations applied before a shape predicate is built.

use geo::{BooleanOps, BoundingRect, Buffer, Centroid, ConvexHull, Geometry};
use serde::{Deserialize, Serialize};

use super::GeoDistance;
use crate::error::{ConditionError, Result};

/// One step of a shape transformation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeoTransformation {
    /// Shape unchanged
    Identity,
    /// Outward buffer by `max_distance`; with `min_distance`, the annulus
    /// between the two buffers
    Clipper {
        max_distance: GeoDistance,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_distance: Option<GeoDistance>,
    },
    /// Bounding rectangle
    #[serde(rename = "bbox")]
    BBox,
    /// Centre of mass as a point
    Centroid,
    /// Smallest convex polygon containing the shape
    ConvexHull,
}

impl GeoTransformation {
    pub fn clipper(max_distance: GeoDistance, min_distance: Option<GeoDistance>) -> Result<Self> {
        let transformation = GeoTransformation::Clipper {
            max_distance,
            min_distance,
        };
        transformation.validate()?;
        Ok(transformation)
    }

    pub fn validate(&self) -> Result<()> {
        if let GeoTransformation::Clipper {
            max_distance,
            min_distance: Some(min_distance),
        } = self
        {
            if min_distance >= max_distance {
                return Err(ConditionError::invalid(
                    "min_distance",
                    format!(
                        "min_distance ({}) must be less than max_distance ({})",
                        min_distance, max_distance
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn apply(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        match self {
            GeoTransformation::Identity => Ok(geometry.clone()),
            GeoTransformation::Clipper {
                max_distance,
                min_distance,
            } => {
                let outer = geometry.buffer(max_distance.to_degrees());
                match min_distance {
                    Some(min_distance) => {
                        let inner = geometry.buffer(min_distance.to_degrees());
                        Ok(Geometry::MultiPolygon(outer.difference(&inner)))
                    }
                    None => Ok(Geometry::MultiPolygon(outer)),
                }
            }
            GeoTransformation::BBox => geometry
                .bounding_rect()
                .map(Geometry::Rect)
                .ok_or_else(|| empty_shape("bbox")),
            GeoTransformation::Centroid => geometry
                .centroid()
                .map(Geometry::Point)
                .ok_or_else(|| empty_shape("centroid")),
            GeoTransformation::ConvexHull => Ok(Geometry::Polygon(geometry.convex_hull())),
        }
    }
}

fn empty_shape(transformation: &str) -> ConditionError {
    ConditionError::invalid(
        "transformations",
        format!("Cannot apply {} transformation to an empty shape", transformation),
    )
}
