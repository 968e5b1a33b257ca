//! Physical-unit calibration from the scale line
//!
//! Calibration is always read from the live scale endpoints at the moment of
//! use, so dragging a scale handle immediately changes every derived length
//! and area.

use crate::domain::{Measurement, ScaleLine};

/// Units-per-pixel factor together with its unit name
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    pub units_per_pixel: f64,
    pub unit: String,
}

impl Calibration {
    /// Calibration from the current scale, None if absent or degenerate
    pub fn from_scale(scale: Option<&ScaleLine>) -> Option<Self> {
        let scale = scale?;
        Some(Self {
            units_per_pixel: units_per_pixel(Some(scale))?,
            unit: scale.unit.clone(),
        })
    }

    /// Convert a pixel length to physical units
    pub fn length(&self, pixels: f64) -> f64 {
        pixels * self.units_per_pixel
    }

    /// Convert a pixel count to physical area
    pub fn area(&self, pixels: f64) -> f64 {
        self.units_per_pixel * self.units_per_pixel * pixels
    }

    /// Unit suffix for areas, e.g. "mm²"
    pub fn area_unit(&self) -> String {
        format!("{}²", self.unit)
    }
}

/// `value / |p2 - p1|`, or None without a usable scale
pub fn units_per_pixel(scale: Option<&ScaleLine>) -> Option<f64> {
    let scale = scale?;
    let pixels = scale.pixel_length();
    if !(pixels > 0.0) || !(scale.value > 0.0) {
        return None;
    }
    Some(scale.value / pixels)
}

/// Physical length of a measurement under the current scale
pub fn measurement_length(measurement: &Measurement, scale: Option<&ScaleLine>) -> Option<f64> {
    Some(measurement.pixel_length() * units_per_pixel(scale)?)
}

/// Format a number like C's `%g`: six significant digits, trailing zeros
/// trimmed, scientific notation for very large or small magnitudes
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Exponent after rounding to the target precision
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn scale(p2: Point, value: f64) -> ScaleLine {
        ScaleLine {
            p1: Point::new(0.0, 0.0),
            p2,
            value,
            unit: "mm".into(),
        }
    }

    #[test]
    fn test_units_per_pixel() {
        let s = scale(Point::new(10.0, 0.0), 5.0);
        assert_eq!(units_per_pixel(Some(&s)), Some(0.5));
        assert_eq!(units_per_pixel(None), None);
    }

    #[test]
    fn test_zero_length_scale_is_uncalibrated() {
        let s = scale(Point::new(0.0, 0.0), 5.0);
        assert_eq!(units_per_pixel(Some(&s)), None);
        assert!(Calibration::from_scale(Some(&s)).is_none());
    }

    #[test]
    fn test_calibrated_area() {
        let s = scale(Point::new(10.0, 0.0), 5.0);
        let cal = Calibration::from_scale(Some(&s)).unwrap();
        assert_eq!(cal.area(100.0), 25.0);
        assert_eq!(cal.area_unit(), "mm²");
    }

    #[test]
    fn test_measurement_follows_edited_scale() {
        let m = Measurement {
            p1: Point::new(0.0, 0.0),
            p2: Point::new(0.0, 20.0),
        };
        let mut s = scale(Point::new(10.0, 0.0), 5.0);
        assert_eq!(measurement_length(&m, Some(&s)), Some(10.0));
        s.p2 = Point::new(20.0, 0.0);
        assert_eq!(measurement_length(&m, Some(&s)), Some(5.0));
        assert_eq!(measurement_length(&m, None), None);
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(25.0), "25");
        assert_eq!(format_general(0.5), "0.5");
        assert_eq!(format_general(6.25), "6.25");
        assert_eq!(format_general(1.0 / 3.0), "0.333333");
        assert_eq!(format_general(123456.0), "123456");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001234), "1.234e-05");
        assert_eq!(format_general(-2.5), "-2.5");
        assert_eq!(format_general(0.0), "0");
    }
}
