// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Linear distances with units, e.g. `"10km"` or `"2.5 mi"`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{dist_to_degrees, EARTH_MEAN_RADIUS_KM};
use crate::error::{ConditionError, Result};

/// Length unit accepted in distance strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoDistanceUnit {
    Millimetres,
    Centimetres,
    Decimetres,
    Metres,
    Decametres,
    Hectometres,
    Kilometres,
    Inches,
    Feet,
    Yards,
    Miles,
    NauticalMiles,
}

impl GeoDistanceUnit {
    /// Size of one unit in metres.
    pub fn metres(self) -> f64 {
        match self {
            GeoDistanceUnit::Millimetres => 0.001,
            GeoDistanceUnit::Centimetres => 0.01,
            GeoDistanceUnit::Decimetres => 0.1,
            GeoDistanceUnit::Metres => 1.0,
            GeoDistanceUnit::Decametres => 10.0,
            GeoDistanceUnit::Hectometres => 100.0,
            GeoDistanceUnit::Kilometres => 1000.0,
            GeoDistanceUnit::Inches => 0.0254,
            GeoDistanceUnit::Feet => 0.3048,
            GeoDistanceUnit::Yards => 0.9144,
            GeoDistanceUnit::Miles => 1609.344,
            GeoDistanceUnit::NauticalMiles => 1852.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            GeoDistanceUnit::Millimetres => "mm",
            GeoDistanceUnit::Centimetres => "cm",
            GeoDistanceUnit::Decimetres => "dm",
            GeoDistanceUnit::Metres => "m",
            GeoDistanceUnit::Decametres => "dam",
            GeoDistanceUnit::Hectometres => "hm",
            GeoDistanceUnit::Kilometres => "km",
            GeoDistanceUnit::Inches => "in",
            GeoDistanceUnit::Feet => "ft",
            GeoDistanceUnit::Yards => "yd",
            GeoDistanceUnit::Miles => "mi",
            GeoDistanceUnit::NauticalMiles => "nmi",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let unit = match name.to_ascii_lowercase().as_str() {
            "mm" | "millimetres" | "millimeters" => GeoDistanceUnit::Millimetres,
            "cm" | "centimetres" | "centimeters" => GeoDistanceUnit::Centimetres,
            "dm" | "decimetres" | "decimeters" => GeoDistanceUnit::Decimetres,
            "" | "m" | "metres" | "meters" => GeoDistanceUnit::Metres,
            "dam" | "decametres" | "decameters" => GeoDistanceUnit::Decametres,
            "hm" | "hectometres" | "hectometers" => GeoDistanceUnit::Hectometres,
            "km" | "kilometres" | "kilometers" => GeoDistanceUnit::Kilometres,
            "in" | "inch" | "inches" => GeoDistanceUnit::Inches,
            "ft" | "foot" | "feet" => GeoDistanceUnit::Feet,
            "yd" | "yard" | "yards" => GeoDistanceUnit::Yards,
            "mi" | "mile" | "miles" => GeoDistanceUnit::Miles,
            "nmi" | "nauticalmiles" => GeoDistanceUnit::NauticalMiles,
            _ => return None,
        };
        Some(unit)
    }
}

/// Non-negative linear distance.
///
/// Serialized as its textual form (`"10km"`). Ordering compares the
/// distance in a common unit, so `"1km" == "1000m"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoDistance {
    value: f64,
    unit: GeoDistanceUnit,
}

impl GeoDistance {
    pub fn new(value: f64, unit: GeoDistanceUnit) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConditionError::invalid(
                "distance",
                format!("Distance must be a non-negative number, but found {}", value),
            ));
        }
        Ok(Self { value, unit })
    }

    pub fn kilometres(value: f64) -> Result<Self> {
        Self::new(value, GeoDistanceUnit::Kilometres)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> GeoDistanceUnit {
        self.unit
    }

    /// The distance expressed in `unit`.
    pub fn value_in(&self, unit: GeoDistanceUnit) -> f64 {
        self.value * self.unit.metres() / unit.metres()
    }

    /// Central angle in degrees on a mean-radius earth.
    pub fn to_degrees(&self) -> f64 {
        dist_to_degrees(self.value_in(GeoDistanceUnit::Kilometres), EARTH_MEAN_RADIUS_KM)
    }

    fn metres(&self) -> f64 {
        self.value * self.unit.metres()
    }
}

impl PartialEq for GeoDistance {
    fn eq(&self, other: &Self) -> bool {
        self.metres() == other.metres()
    }
}

impl PartialOrd for GeoDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.metres().partial_cmp(&other.metres())
    }
}

impl FromStr for GeoDistance {
    type Err = ConditionError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let value: f64 = number.trim().parse().map_err(|_| {
            ConditionError::invalid("distance", format!("Unparseable distance '{}'", input))
        })?;
        let unit = GeoDistanceUnit::parse(unit.trim()).ok_or_else(|| {
            ConditionError::invalid(
                "distance",
                format!("Unknown distance unit '{}' in '{}'", unit.trim(), input),
            )
        })?;
        Self::new(value, unit)
    }
}

impl TryFrom<String> for GeoDistance {
    type Error = ConditionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GeoDistance> for String {
    fn from(distance: GeoDistance) -> Self {
        distance.to_string()
    }
}

impl fmt::Display for GeoDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.symbol())
    }
}
