//! Unit conversion
//!
//! Length and weight convert through a base unit (metre, kilogram) using
//! per-base factors; temperature converts through Celsius.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type for unit conversion
pub type UnitResult<T> = Result<T, UnitError>;

/// Unit conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// Units belong to different categories
    #[error("Cannot convert {from} to {to}")]
    Incompatible {
        /// Source unit symbol
        from: &'static str,
        /// Target unit symbol
        to: &'static str,
    },
    /// Unknown unit symbol
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
    /// Display does not start with a number
    #[error("Not a number: {0}")]
    NotANumber(String),
}

/// Kind of quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Length
    Length,
    /// Weight
    Weight,
    /// Temperature
    Temperature,
}

/// Supported units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Metre
    #[serde(rename = "m")]
    Meter,
    /// Foot
    #[serde(rename = "ft")]
    Foot,
    /// Inch
    #[serde(rename = "in")]
    Inch,
    /// Centimetre
    #[serde(rename = "cm")]
    Centimeter,
    /// Kilometre
    #[serde(rename = "km")]
    Kilometer,
    /// Kilogram
    #[serde(rename = "kg")]
    Kilogram,
    /// Pound
    #[serde(rename = "lb")]
    Pound,
    /// Ounce
    #[serde(rename = "oz")]
    Ounce,
    /// Gram
    #[serde(rename = "g")]
    Gram,
    /// Degrees Celsius
    #[serde(rename = "c")]
    Celsius,
    /// Degrees Fahrenheit
    #[serde(rename = "f")]
    Fahrenheit,
    /// Kelvin
    #[serde(rename = "k")]
    Kelvin,
}

impl Unit {
    /// Every supported unit
    pub const ALL: [Self; 12] = [
        Self::Meter,
        Self::Foot,
        Self::Inch,
        Self::Centimeter,
        Self::Kilometer,
        Self::Kilogram,
        Self::Pound,
        Self::Ounce,
        Self::Gram,
        Self::Celsius,
        Self::Fahrenheit,
        Self::Kelvin,
    ];

    /// Short symbol, e.g. `km`
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Meter => "m",
            Self::Foot => "ft",
            Self::Inch => "in",
            Self::Centimeter => "cm",
            Self::Kilometer => "km",
            Self::Kilogram => "kg",
            Self::Pound => "lb",
            Self::Ounce => "oz",
            Self::Gram => "g",
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }

    /// Category this unit measures
    #[must_use]
    pub const fn category(&self) -> UnitCategory {
        match self {
            Self::Meter | Self::Foot | Self::Inch | Self::Centimeter | Self::Kilometer => {
                UnitCategory::Length
            }
            Self::Kilogram | Self::Pound | Self::Ounce | Self::Gram => UnitCategory::Weight,
            Self::Celsius | Self::Fahrenheit | Self::Kelvin => UnitCategory::Temperature,
        }
    }

    /// Units per base unit (metre or kilogram); None for temperatures
    #[must_use]
    pub const fn factor(&self) -> Option<f64> {
        match self {
            Self::Meter | Self::Kilogram => Some(1.0),
            Self::Foot => Some(3.28084),
            Self::Inch => Some(39.3701),
            Self::Centimeter => Some(100.0),
            Self::Kilometer => Some(0.001),
            Self::Pound => Some(2.20462),
            Self::Ounce => Some(35.274),
            Self::Gram => Some(1000.0),
            Self::Celsius | Self::Fahrenheit | Self::Kelvin => None,
        }
    }

    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Kelvin => value - 273.15,
            _ => value,
        }
    }

    fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            Self::Kelvin => celsius + 273.15,
            _ => celsius,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> UnitResult<Self> {
        let unit = match s.trim().trim_start_matches('°').to_ascii_lowercase().as_str() {
            "m" => Self::Meter,
            "ft" => Self::Foot,
            "in" => Self::Inch,
            "cm" => Self::Centimeter,
            "km" => Self::Kilometer,
            "kg" => Self::Kilogram,
            "lb" => Self::Pound,
            "oz" => Self::Ounce,
            "g" => Self::Gram,
            "c" => Self::Celsius,
            "f" => Self::Fahrenheit,
            "k" => Self::Kelvin,
            _ => return Err(UnitError::UnknownUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// Converts `value` from one unit to another of the same category
pub fn convert(value: f64, from: Unit, to: Unit) -> UnitResult<f64> {
    if from.category() != to.category() {
        return Err(UnitError::Incompatible {
            from: from.symbol(),
            to: to.symbol(),
        });
    }

    match (from.factor(), to.factor()) {
        (Some(from_factor), Some(to_factor)) => Ok(value / from_factor * to_factor),
        _ => Ok(to.from_celsius(from.to_celsius(value))),
    }
}
