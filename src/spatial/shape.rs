// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! WKT-parsed shapes.

use geo::{CoordsIter, Geometry};
use serde::{Deserialize, Serialize};
use wkt::TryFromWkt;

use super::{check_latitude, check_longitude};
use crate::error::{ConditionError, Result};

/// A geometry parsed from Well-Known Text, keeping its source text.
///
/// Serialized as the WKT string it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WktShape {
    wkt: String,
    geometry: Geometry<f64>,
}

impl WktShape {
    /// Parse WKT; every coordinate must be a valid longitude/latitude pair.
    pub fn parse(wkt: &str) -> Result<Self> {
        let trimmed = wkt.trim();
        if trimmed.is_empty() {
            return Err(ConditionError::invalid("shape", "Shape required"));
        }

        let geometry = Geometry::<f64>::try_from_wkt_str(trimmed)
            .map_err(|e| ConditionError::parse("shape", trimmed, e.to_string()))?;

        for coord in geometry.coords_iter() {
            check_longitude("shape longitude", coord.x)?;
            check_latitude("shape latitude", coord.y)?;
        }

        Ok(Self {
            wkt: trimmed.to_string(),
            geometry,
        })
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }
}

impl TryFrom<String> for WktShape {
    type Error = ConditionError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<WktShape> for String {
    fn from(shape: WktShape) -> Self {
        shape.wkt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let shape = WktShape::parse("POLYGON((-4 40, -3 40, -3 41, -4 41, -4 40))").unwrap();
        assert!(matches!(shape.geometry(), Geometry::Polygon(_)));
    }

    #[test]
    fn test_malformed_wkt_is_parse_failure() {
        let err = WktShape::parse("POLYGON((1 2, 3").unwrap_err();
        assert_eq!(err.kind(), "parse_failure");
        assert!(err.to_string().starts_with("Unparseable shape 'POLYGON((1 2, 3'"));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let err = WktShape::parse("POINT(200 10)").unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_blank() {
        assert!(WktShape::parse("   ").is_err());
    }

    #[test]
    fn test_serde_keeps_source_text() {
        let shape: WktShape = serde_json::from_str("\"POINT(-3.7 40.4)\"").unwrap();
        assert_eq!(shape.wkt(), "POINT(-3.7 40.4)");
        assert_eq!(serde_json::to_string(&shape).unwrap(), "\"POINT(-3.7 40.4)\"");
    }
}
