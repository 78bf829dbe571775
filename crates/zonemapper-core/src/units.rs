//! Length unit handling
//!
//! All stored geometry is kept in millimeters (the canonical unit). Display
//! units are only applied at the edges: configuration input, tick labels,
//! range-ring labels, and the info line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported length units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    /// Millimeters (canonical)
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    /// Centimeters
    #[serde(rename = "cm")]
    Centimeter,
    /// Meters
    #[serde(rename = "m")]
    Meter,
    /// Inches
    #[serde(rename = "in")]
    Inch,
    /// Feet
    #[serde(rename = "ft")]
    Foot,
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(Self::Millimeter)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(Self::Centimeter)
            }
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(Self::Meter),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            "ft" | "foot" | "feet" => Ok(Self::Foot),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

const IMPERIAL_INCH_STEPS: [f64; 12] = [
    1.0, 2.0, 3.0, 6.0, 12.0, 24.0, 36.0, 48.0, 60.0, 72.0, 96.0, 120.0,
];
const IMPERIAL_FOOT_STEPS: [f64; 9] = [0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];
const METRIC_STEPS: [f64; 10] = [0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];

impl LengthUnit {
    /// All supported units, metric first.
    pub const ALL: [LengthUnit; 5] = [
        Self::Millimeter,
        Self::Centimeter,
        Self::Meter,
        Self::Inch,
        Self::Foot,
    ];

    /// Millimeters in one unit.
    pub fn mm_per_unit(self) -> f64 {
        match self {
            Self::Millimeter => 1.0,
            Self::Centimeter => 10.0,
            Self::Meter => 1000.0,
            Self::Inch => 25.4,
            Self::Foot => 304.8,
        }
    }

    /// Short unit code, also used as the label suffix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::Inch => "in",
            Self::Foot => "ft",
        }
    }

    pub fn is_imperial(self) -> bool {
        matches!(self, Self::Inch | Self::Foot)
    }

    /// Unit used for grid tick labels. Millimeter grids are labelled in
    /// meters and inch grids in feet; the rest label in their own unit.
    pub fn grid_display_unit(self) -> LengthUnit {
        match self {
            Self::Millimeter => Self::Meter,
            Self::Inch => Self::Foot,
            other => other,
        }
    }

    /// Human-friendly tick steps (in this unit) tried by the grid step search.
    pub fn grid_step_candidates(self) -> &'static [f64] {
        match self {
            Self::Inch => &IMPERIAL_INCH_STEPS,
            Self::Foot => &IMPERIAL_FOOT_STEPS,
            _ => &METRIC_STEPS,
        }
    }
}

/// Resolves a raw unit string to a unit, defaulting to millimeters when the
/// value is missing, blank, or unrecognized.
pub fn normalize_unit(raw: Option<&str>) -> LengthUnit {
    match raw {
        Some(text) if !text.trim().is_empty() => text.parse().unwrap_or_default(),
        _ => LengthUnit::Millimeter,
    }
}

/// Converts a value in `unit` to millimeters. Returns `None` for non-finite input.
pub fn to_canonical(value: f64, unit: LengthUnit) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(value * unit.mm_per_unit())
}

/// Converts millimeters to `unit`. Returns `None` for non-finite input.
pub fn from_canonical(value_mm: f64, unit: LengthUnit) -> Option<f64> {
    if !value_mm.is_finite() {
        return None;
    }
    Some(value_mm / unit.mm_per_unit())
}

/// Formats with a fixed number of decimals, then drops redundant trailing zeros.
fn format_fixed_trimmed(value: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Formats a number for display.
///
/// Magnitudes of 1000 and above get no decimals, 100 and above get one,
/// everything smaller gets two. Trailing zeros are stripped, so `12.50`
/// renders as `12.5` and `3.00` as `3`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let abs = value.abs();
    let decimals = if abs >= 1000.0 {
        0
    } else if abs >= 100.0 {
        1
    } else {
        2
    };
    format_fixed_trimmed(value, decimals)
}

/// Formats a canonical value expressed in `unit`.
pub fn format_grid_value(value_mm: f64, unit: LengthUnit) -> String {
    match from_canonical(value_mm, unit) {
        Some(converted) => format_number(converted),
        None => "0".to_string(),
    }
}

/// Decimal places for a tick label, derived from the step size in the
/// display unit.
pub fn tick_label_decimals(step_units: f64) -> usize {
    let is_integer_step = (step_units - step_units.round()).abs() < 1e-6;
    if is_integer_step {
        0
    } else if step_units >= 0.5 {
        1
    } else {
        2
    }
}

/// Formats a tick or range-ring label such as `2m` or `1.5ft`.
pub fn format_tick_label(value_mm: f64, step_mm: f64, display_unit: LengthUnit) -> String {
    let step_units = step_mm / display_unit.mm_per_unit();
    let decimals = tick_label_decimals(step_units);
    let value_units = from_canonical(value_mm, display_unit).unwrap_or(0.0);
    format!(
        "{}{}",
        format_fixed_trimmed(value_units, decimals),
        display_unit.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unit_is_millimeter() {
        assert_eq!(LengthUnit::default(), LengthUnit::Millimeter);
        assert_eq!(normalize_unit(Some("parsecs")), LengthUnit::Millimeter);
    }

    #[test]
    fn test_aliases_are_case_insensitive() {
        assert_eq!("Millimetres".parse::<LengthUnit>(), Ok(LengthUnit::Millimeter));
        assert_eq!(" FEET ".parse::<LengthUnit>(), Ok(LengthUnit::Foot));
        assert_eq!("Inch".parse::<LengthUnit>(), Ok(LengthUnit::Inch));
        assert_eq!("metre".parse::<LengthUnit>(), Ok(LengthUnit::Meter));
        assert_eq!("CM".parse::<LengthUnit>(), Ok(LengthUnit::Centimeter));
        assert!("furlong".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_normalize_defaults_to_mm() {
        assert_eq!(normalize_unit(None), LengthUnit::Millimeter);
        assert_eq!(normalize_unit(Some("")), LengthUnit::Millimeter);
        assert_eq!(normalize_unit(Some("parsec")), LengthUnit::Millimeter);
        assert_eq!(normalize_unit(Some("ft")), LengthUnit::Foot);
    }

    #[test]
    fn test_conversion_fails_soft() {
        assert_eq!(to_canonical(f64::NAN, LengthUnit::Meter), None);
        assert_eq!(from_canonical(f64::INFINITY, LengthUnit::Meter), None);
        assert_eq!(to_canonical(2.0, LengthUnit::Meter), Some(2000.0));
        assert_eq!(to_canonical(1.0, LengthUnit::Foot), Some(304.8));
        assert_eq!(from_canonical(254.0, LengthUnit::Inch), Some(10.0));
    }

    #[test]
    fn test_format_number_precision() {
        assert_eq!(format_number(1234.567), "1235");
        assert_eq!(format_number(123.456), "123.5");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.126), "0.13");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_grid_display_unit() {
        assert_eq!(LengthUnit::Millimeter.grid_display_unit(), LengthUnit::Meter);
        assert_eq!(LengthUnit::Inch.grid_display_unit(), LengthUnit::Foot);
        assert_eq!(LengthUnit::Centimeter.grid_display_unit(), LengthUnit::Centimeter);
    }

    #[test]
    fn test_tick_label_decimals() {
        assert_eq!(tick_label_decimals(2.0), 0);
        assert_eq!(tick_label_decimals(2.5), 1);
        assert_eq!(tick_label_decimals(0.5), 1);
        assert_eq!(tick_label_decimals(0.2), 2);
    }

    #[test]
    fn test_format_tick_label() {
        assert_eq!(format_tick_label(2000.0, 1000.0, LengthUnit::Meter), "2m");
        assert_eq!(format_tick_label(1500.0, 500.0, LengthUnit::Meter), "1.5m");
        assert_eq!(format_tick_label(-200.0, 200.0, LengthUnit::Meter), "-0.2m");
        assert_eq!(format_tick_label(1219.2, 1219.2, LengthUnit::Foot), "4ft");
    }

    #[test]
    fn test_format_grid_value() {
        assert_eq!(format_grid_value(6000.0, LengthUnit::Meter), "6");
        assert_eq!(format_grid_value(-6000.0, LengthUnit::Millimeter), "-6000");
        assert_eq!(format_grid_value(304.8, LengthUnit::Foot), "1");
    }
}
