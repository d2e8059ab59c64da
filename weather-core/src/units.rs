//! Temperature conversion between the API's Celsius values and the display unit.

use crate::model::DisplayUnit;

/// Convert Celsius to Fahrenheit, rounded to one decimal.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round1(celsius * 1.8 + 32.0)
}

/// Convert Fahrenheit to Celsius, rounded to one decimal.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    round1((fahrenheit - 32.0) / 1.8)
}

/// Nearest whole degree of `temp_c` in the requested unit.
pub fn display_temp(temp_c: f64, unit: DisplayUnit) -> i64 {
    match unit {
        DisplayUnit::Metric => round_half_up(temp_c) as i64,
        DisplayUnit::Imperial => round_half_up(celsius_to_fahrenheit(temp_c)) as i64,
    }
}

/// Round to the nearest integer with halves going up, so `-2.5` becomes `-2`.
///
/// `f64::round` sends halves away from zero, which would show `-3` instead.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
