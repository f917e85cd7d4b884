// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Geospatial conditions: bounding box, distance band and WKT shape.

use geo::{coord, Geometry, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{check_field, resolve_mapper};
use crate::error::{ConditionError, Result};
use crate::query::{BooleanQuery, Query, Shape};
use crate::schema::{GeoPointMapper, Schema};
use crate::spatial::{
    check_latitude, check_longitude, GeoDistance, GeoTransformation, SpatialOperation, WktShape,
};

fn geo_point_mapper<'a>(schema: &'a Schema, field: &str) -> Result<&'a GeoPointMapper> {
    let mapper = resolve_mapper(schema, field)?;
    mapper
        .geo_point()
        .ok_or_else(|| ConditionError::wrong_mapper(field, "geo_point", mapper.kind()))
}

/// Points inside a latitude/longitude rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBBoxCondition {
    field: String,
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl GeoBBoxCondition {
    pub fn new(
        field: impl Into<String>,
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_latitude("min_latitude", self.min_latitude)?;
        check_latitude("max_latitude", self.max_latitude)?;
        check_longitude("min_longitude", self.min_longitude)?;
        check_longitude("max_longitude", self.max_longitude)?;
        if self.min_latitude > self.max_latitude {
            return Err(ConditionError::invalid(
                "min_latitude",
                format!(
                    "min_latitude ({}) must be less than or equal to max_latitude ({})",
                    self.min_latitude, self.max_latitude
                ),
            ));
        }
        if self.min_longitude > self.max_longitude {
            return Err(ConditionError::invalid(
                "min_longitude",
                format!(
                    "min_longitude ({}) must be less than or equal to max_longitude ({})",
                    self.min_longitude, self.max_longitude
                ),
            ));
        }
        Ok(())
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let strategy = geo_point_mapper(schema, &self.field)?.bbox_strategy();
        let rect = Rect::new(
            coord! { x: self.min_longitude, y: self.min_latitude },
            coord! { x: self.max_longitude, y: self.max_latitude },
        );
        Ok(strategy.make_query(SpatialOperation::Intersects, Shape::Rectangle(rect), 0.0))
    }
}

/// Points within `max_distance` of a centre and, optionally, beyond
/// `min_distance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDistanceCondition {
    field: String,
    latitude: f64,
    longitude: f64,
    max_distance: GeoDistance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_distance: Option<GeoDistance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl GeoDistanceCondition {
    pub fn new(
        field: impl Into<String>,
        latitude: f64,
        longitude: f64,
        max_distance: GeoDistance,
    ) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            latitude,
            longitude,
            max_distance,
            min_distance: None,
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    /// Exclude points closer than `min_distance`; it must be below the maximum.
    pub fn with_min_distance(mut self, min_distance: GeoDistance) -> Result<Self> {
        self.min_distance = Some(min_distance);
        self.validate()?;
        Ok(self)
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        check_latitude("latitude", self.latitude)?;
        check_longitude("longitude", self.longitude)?;
        if let Some(min_distance) = &self.min_distance {
            if *min_distance >= self.max_distance {
                return Err(ConditionError::invalid(
                    "min_distance",
                    format!(
                        "min_distance ({}) must be less than max_distance ({})",
                        min_distance, self.max_distance
                    ),
                ));
            }
        }
        Ok(())
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let strategy = geo_point_mapper(schema, &self.field)?.distance_strategy();
        let center = Point::new(self.longitude, self.latitude);
        let circle = |distance: &GeoDistance| {
            strategy.make_query(
                SpatialOperation::Intersects,
                Shape::Circle {
                    center,
                    radius_degrees: distance.to_degrees(),
                },
                0.0,
            )
        };

        let outer = circle(&self.max_distance);
        Ok(match &self.min_distance {
            Some(min_distance) => BooleanQuery::new()
                .filter(outer)
                .must_not(circle(min_distance))
                .build(),
            None => outer,
        })
    }
}

fn default_shape_operation() -> SpatialOperation {
    SpatialOperation::IsWithin
}

/// Indexed shapes related to a WKT shape, after optional transformations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoShapeCondition {
    field: String,
    shape: WktShape,
    #[serde(default = "default_shape_operation")]
    operation: SpatialOperation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    transformations: Vec<GeoTransformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) boost: Option<f32>,
}

impl GeoShapeCondition {
    /// Parse `wkt` and relate with [`SpatialOperation::IsWithin`].
    pub fn new(field: impl Into<String>, wkt: &str) -> Result<Self> {
        let condition = Self {
            field: field.into(),
            shape: WktShape::parse(wkt)?,
            operation: default_shape_operation(),
            transformations: Vec::new(),
            boost: None,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn with_operation(mut self, operation: SpatialOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Append a transformation; they run in insertion order.
    pub fn transform(mut self, transformation: GeoTransformation) -> Result<Self> {
        transformation.validate()?;
        self.transformations.push(transformation);
        Ok(self)
    }

    pub fn operation(&self) -> SpatialOperation {
        self.operation
    }

    /// The query shape once every transformation has run.
    pub fn transformed_shape(&self) -> Result<Geometry<f64>> {
        self.transformations
            .iter()
            .try_fold(self.shape.geometry().clone(), |geometry, t| t.apply(&geometry))
    }

    pub(super) fn validate(&self) -> Result<()> {
        check_field(&self.field)?;
        self.transformations
            .iter()
            .try_for_each(GeoTransformation::validate)
    }

    pub(super) fn compile_unboosted(&self, schema: &Schema) -> Result<Query> {
        let mapper = resolve_mapper(schema, &self.field)?;
        let strategy = mapper.shape_strategy().ok_or_else(|| {
            ConditionError::wrong_mapper(&self.field, "geo_point or geo_shape", mapper.kind())
        })?;
        let geometry = self.transformed_shape()?;
        Ok(strategy.make_query(self.operation, Shape::Geometry(geometry), 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SpatialQuery;
    use crate::schema::{GeoShapeMapper, DEFAULT_MAX_LEVELS};
    use crate::spatial::StrategyKind;

    fn schema() -> Schema {
        Schema::new()
            .string("name")
            .add_mapper(GeoPointMapper::new("place", "lat", "lon"))
            .add_mapper(GeoShapeMapper::new("area"))
    }

    fn km(value: f64) -> GeoDistance {
        GeoDistance::kilometres(value).unwrap()
    }

    #[test]
    fn test_bbox_validation() {
        assert!(GeoBBoxCondition::new("place", 40.0, 41.0, -4.0, -3.0).is_ok());
        assert!(GeoBBoxCondition::new("place", 41.0, 40.0, -4.0, -3.0).is_err());
        assert!(GeoBBoxCondition::new("place", 40.0, 41.0, -3.0, -4.0).is_err());
        assert!(GeoBBoxCondition::new("place", 40.0, 40.0, -3.0, -3.0).is_ok());

        let err = GeoBBoxCondition::new("place", -91.0, 41.0, -4.0, -3.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "min_latitude must be in range [-90.0, 90.0], but found -91"
        );
    }

    #[test]
    fn test_bbox_compiles_to_rectangle() {
        let query = GeoBBoxCondition::new("place", 40.0, 41.0, -4.0, -3.0)
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        assert_eq!(
            query.to_string(),
            "place:Intersects(Rect(minX=-4 maxX=-3 minY=40 maxY=41))"
        );
    }

    #[test]
    fn test_bbox_requires_geo_point() {
        let condition = GeoBBoxCondition::new("name", 40.0, 41.0, -4.0, -3.0).unwrap();
        let err = condition.compile_unboosted(&schema()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'name' requires a geo_point mapper, but found a 'string' mapper"
        );
        let condition = GeoBBoxCondition::new("area", 40.0, 41.0, -4.0, -3.0).unwrap();
        assert!(condition.compile_unboosted(&schema()).is_err());
    }

    #[test]
    fn test_distance_band_ordering() {
        let base = GeoDistanceCondition::new("place", 40.0, -3.0, km(10.0)).unwrap();
        assert!(base.clone().with_min_distance(km(1.0)).is_ok());
        assert!(base.clone().with_min_distance(km(10.0)).is_err());
        assert!(base.with_min_distance(km(11.0)).is_err());
    }

    #[test]
    fn test_distance_degrees() {
        let query = GeoDistanceCondition::new("place", 40.0, -3.0, km(111.19))
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        let Query::Spatial(SpatialQuery { shape: Shape::Circle { center, radius_degrees }, strategy, .. }) = query else {
            panic!("Expected circle, got {:?}", query);
        };
        assert_eq!(strategy, StrategyKind::PointVector);
        assert_eq!(center, Point::new(-3.0, 40.0));
        assert!((radius_degrees - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_distance_band_excludes_inner_circle() {
        let query = GeoDistanceCondition::new("place", 40.0, -3.0, km(10.0))
            .unwrap()
            .with_min_distance(km(1.0))
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap();
        let Query::Boolean(boolean) = query else {
            panic!("Expected boolean, got {:?}", query);
        };
        assert_eq!(boolean.clauses.len(), 2);
        assert_eq!(boolean.clauses_with(crate::query::Occur::MustNot).count(), 1);
    }

    #[test]
    fn test_shape_defaults_to_is_within() {
        let condition = GeoShapeCondition::new("area", "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        assert_eq!(condition.operation(), SpatialOperation::IsWithin);

        let json = serde_json::json!({
            "field": "area",
            "shape": "POINT(1 2)",
        });
        let parsed: GeoShapeCondition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.operation(), SpatialOperation::IsWithin);
    }

    #[test]
    fn test_shape_strategy_from_either_mapper() {
        for field in ["place", "area"] {
            let query = GeoShapeCondition::new(field, "POINT(1 2)")
                .unwrap()
                .with_operation(SpatialOperation::Intersects)
                .compile_unboosted(&schema())
                .unwrap();
            let Query::Spatial(spatial) = query else {
                panic!("Expected spatial query");
            };
            assert_eq!(spatial.strategy, StrategyKind::PrefixTree { max_levels: DEFAULT_MAX_LEVELS });
            assert_eq!(spatial.distance_error_pct, 0.0);
        }

        let err = GeoShapeCondition::new("name", "POINT(1 2)")
            .unwrap()
            .compile_unboosted(&schema())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'name' requires a geo_point or geo_shape mapper, but found a 'string' mapper"
        );
    }

    #[test]
    fn test_shape_malformed_wkt() {
        let err = GeoShapeCondition::new("area", "POLYGON((0 0, 1 0").unwrap_err();
        assert!(matches!(err, ConditionError::ParseFailure { what: "shape", .. }));
    }

    #[test]
    fn test_transformations_run_in_order() {
        let condition = GeoShapeCondition::new("area", "LINESTRING(0 0, 2 4)")
            .unwrap()
            .transform(GeoTransformation::BBox)
            .unwrap()
            .transform(GeoTransformation::Centroid)
            .unwrap();
        assert_eq!(
            condition.transformed_shape().unwrap(),
            Geometry::Point(Point::new(1.0, 2.0))
        );
    }
}
