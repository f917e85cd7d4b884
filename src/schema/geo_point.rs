// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Geographic point and shape mappers.

use geo::{Geometry, Point};

use super::mapper::{unconvertible, FieldValue, IndexedField, Mapper};
use crate::analysis::Analyzer;
use crate::error::{ConditionError, Result};
use crate::spatial::{check_latitude, check_longitude, SpatialStrategy, StrategyKind, WktShape};
use crate::value::{Row, Value};

/// Default depth of the shape grid.
pub const DEFAULT_MAX_LEVELS: u8 = 11;

/// Point built from a latitude column and a longitude column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPointMapper {
    field: String,
    latitude: String,
    longitude: String,
    max_levels: u8,
}

impl GeoPointMapper {
    pub fn new(
        field: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    pub fn max_levels(mut self, max_levels: u8) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Strategy for distance (circle) predicates.
    pub fn distance_strategy(&self) -> SpatialStrategy {
        SpatialStrategy::new(self.field.clone(), StrategyKind::PointVector)
    }

    /// Strategy for bounding-box predicates.
    pub fn bbox_strategy(&self) -> SpatialStrategy {
        SpatialStrategy::new(self.field.clone(), StrategyKind::BBox)
    }

    fn coordinate(&self, name: &str, value: &Value) -> Result<f64> {
        let coordinate = match value {
            Value::Int(n) => *n as f64,
            Value::Float(n) => *n,
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| unconvertible(&self.field, name, value))?,
            other => return Err(unconvertible(&self.field, name, other)),
        };
        if name == "latitude" {
            check_latitude("latitude", coordinate)
        } else {
            check_longitude("longitude", coordinate)
        }
    }
}

impl Mapper for GeoPointMapper {
    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> &'static str {
        "geo_point"
    }

    fn columns(&self) -> Vec<&str> {
        vec![self.latitude.as_str(), self.longitude.as_str()]
    }

    fn geo_point(&self) -> Option<&GeoPointMapper> {
        Some(self)
    }

    fn shape_strategy(&self) -> Option<SpatialStrategy> {
        Some(SpatialStrategy::new(
            self.field.clone(),
            StrategyKind::PrefixTree {
                max_levels: self.max_levels,
            },
        ))
    }

    fn index(&self, row: &Row, _analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>> {
        let latitude = row.get(&self.latitude).filter(|v| !v.is_null());
        let longitude = row.get(&self.longitude).filter(|v| !v.is_null());

        match (latitude, longitude) {
            (None, None) => Ok(Vec::new()),
            (Some(latitude), Some(longitude)) => {
                let lat = self.coordinate("latitude", latitude)?;
                let lon = self.coordinate("longitude", longitude)?;
                Ok(vec![IndexedField::new(
                    self.field.clone(),
                    FieldValue::Shape(Geometry::Point(Point::new(lon, lat))),
                )])
            }
            (Some(_), None) => Err(ConditionError::invalid(
                "longitude",
                format!("Field '{}' requires column '{}'", self.field, self.longitude),
            )),
            (None, Some(_)) => Err(ConditionError::invalid(
                "latitude",
                format!("Field '{}' requires column '{}'", self.field, self.latitude),
            )),
        }
    }
}

/// Arbitrary shapes stored as WKT text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoShapeMapper {
    field: String,
    column: String,
    max_levels: u8,
}

impl GeoShapeMapper {
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            column: field.clone(),
            field,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn max_levels(mut self, max_levels: u8) -> Self {
        self.max_levels = max_levels;
        self
    }
}

impl Mapper for GeoShapeMapper {
    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> &'static str {
        "geo_shape"
    }

    fn columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn shape_strategy(&self) -> Option<SpatialStrategy> {
        Some(SpatialStrategy::new(
            self.field.clone(),
            StrategyKind::PrefixTree {
                max_levels: self.max_levels,
            },
        ))
    }

    fn index(&self, row: &Row, _analyzer: &dyn Analyzer) -> Result<Vec<IndexedField>> {
        let Some(column) = row.get(&self.column) else {
            return Ok(Vec::new());
        };

        column
            .scalars()
            .into_iter()
            .map(|value| match value {
                Value::Text(wkt) => {
                    let shape = WktShape::parse(wkt)?;
                    Ok(IndexedField::new(
                        self.field.clone(),
                        FieldValue::Shape(shape.geometry().clone()),
                    ))
                }
                other => Err(unconvertible(&self.field, "a WKT shape", other)),
            })
            .collect()
    }
}
