// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Geospatial building blocks shared by the geo conditions.
//!
//! Coordinates follow the x = longitude, y = latitude convention of the
//! `geo` crate. Linear distances are converted to central angles in degrees
//! with a mean-earth-radius approximation before they reach a strategy.

mod distance;
mod shape;
mod strategy;
mod transformation;

pub use distance::{GeoDistance, GeoDistanceUnit};
pub use shape::WktShape;
pub use strategy::{SpatialStrategy, StrategyKind};
pub use transformation::GeoTransformation;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConditionError, Result};

/// Mean earth radius in kilometres.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0087714;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Convert a surface distance into a central angle in degrees.
pub fn dist_to_degrees(distance: f64, radius: f64) -> f64 {
    (distance / radius).to_degrees()
}

/// Validate a latitude, naming `parameter` in the error.
pub fn check_latitude(parameter: &str, latitude: f64) -> Result<f64> {
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return Err(ConditionError::invalid(
            parameter,
            format!(
                "{} must be in range [{:.1}, {:.1}], but found {}",
                parameter, MIN_LATITUDE, MAX_LATITUDE, latitude
            ),
        ));
    }
    Ok(latitude)
}

/// Validate a longitude, naming `parameter` in the error.
pub fn check_longitude(parameter: &str, longitude: f64) -> Result<f64> {
    if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Err(ConditionError::invalid(
            parameter,
            format!(
                "{} must be in range [{:.1}, {:.1}], but found {}",
                parameter, MIN_LONGITUDE, MAX_LONGITUDE, longitude
            ),
        ));
    }
    Ok(longitude)
}

/// Relation between indexed shapes and the query shape.
///
/// Read as "indexed shape `<operation>` query shape".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialOperation {
    #[default]
    Intersects,
    IsWithin,
    Contains,
    IsDisjointTo,
}

impl fmt::Display for SpatialOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialOperation::Intersects => write!(f, "Intersects"),
            SpatialOperation::IsWithin => write!(f, "IsWithin"),
            SpatialOperation::Contains => write!(f, "Contains"),
            SpatialOperation::IsDisjointTo => write!(f, "IsDisjointTo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_is_about_111_km() {
        let degrees = dist_to_degrees(111.19, EARTH_MEAN_RADIUS_KM);
        assert!((degrees - 1.0).abs() < 1e-3, "got {}", degrees);
    }

    #[test]
    fn test_latitude_bounds() {
        assert_eq!(check_latitude("latitude", 90.0).unwrap(), 90.0);
        assert!(check_latitude("latitude", 90.1).is_err());
        assert!(check_latitude("latitude", f64::NAN).is_err());

        let err = check_latitude("min_latitude", -91.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "min_latitude must be in range [-90.0, 90.0], but found -91"
        );
    }

    #[test]
    fn test_longitude_bounds() {
        assert!(check_longitude("longitude", -180.0).is_ok());
        assert!(check_longitude("longitude", 180.5).is_err());
    }

    #[test]
    fn test_operation_serde_names() {
        let op: SpatialOperation = serde_json::from_str("\"is_disjoint_to\"").unwrap();
        assert_eq!(op, SpatialOperation::IsDisjointTo);
        assert_eq!(serde_json::to_string(&SpatialOperation::IsWithin).unwrap(), "\"is_within\"");
    }
}
