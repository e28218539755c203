//! Flexible duration input.
//!
//! Users type durations either as decimal hours (`"1.5"`) or as
//! `H:MM` (`"1:30"`). Both forms parse to minutes; formatting goes back to
//! whichever notation the user started with.

use crate::error::{CoreError, Result};

/// Smallest duration `adjust_duration` will produce, in minutes.
pub const MIN_ADJUSTED_MINUTES: f64 = 1.0;

// Absorbs binary float noise (1.15 h * 100 = 114.999...) before truncating.
const TRUNCATE_EPSILON: f64 = 1e-9;

/// Parse a duration string into minutes.
///
/// - `""` → `0`
/// - `"1:30"` → `90`, `"2:"` → `120`, `":45"` → `45`
/// - `"1.5"` → `90`
///
/// Anything else is rejected as invalid input.
pub fn parse_duration(input: &str) -> Result<f64> {
    let value = input.trim();
    if value.is_empty() {
        return Ok(0.0);
    }

    if let Some((hours, minutes)) = value.split_once(':') {
        let h = parse_component(hours, input)?;
        let m = parse_component(minutes, input)?;
        return Ok(h * 60.0 + m);
    }

    Ok(parse_number(value, input)? * 60.0)
}

/// Format minutes as either `H:MM` or decimal hours.
///
/// Decimal output is truncated to two places with trailing zeros removed,
/// so `60` → `"1"` and `90` → `"1.5"`.
pub fn format_duration(minutes: f64, colon_form: bool) -> String {
    if colon_form {
        let total = minutes.round() as i64;
        let h = total.div_euclid(60);
        let m = total.rem_euclid(60);
        return format!("{h}:{m:02}");
    }

    let hours = minutes / 60.0;
    let truncated = (hours.abs() * 100.0 + TRUNCATE_EPSILON).trunc() / 100.0;
    let signed = if hours < 0.0 { -truncated } else { truncated };
    // `-0` would otherwise print as "-0".
    if signed == 0.0 {
        return "0".to_string();
    }
    format!("{signed}")
}

/// Add `delta_hours` to a duration string, keeping its notation.
///
/// The result never drops below one minute.
pub fn adjust_duration(current: &str, delta_hours: f64) -> Result<String> {
    if !delta_hours.is_finite() {
        return Err(CoreError::invalid_input(
            "delta_hours",
            format!("{delta_hours} is not a finite number"),
        ));
    }
    let colon_form = current.contains(':');
    let minutes = (parse_duration(current)? + delta_hours * 60.0).max(MIN_ADJUSTED_MINUTES);
    Ok(format_duration(minutes, colon_form))
}

/// Short display form of a stored duration in hours (`1.5 h`).
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 10.0).round() / 10.0;
    format!("{} h", if rounded == 0.0 { 0.0 } else { rounded })
}

fn parse_component(part: &str, original: &str) -> Result<f64> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(0.0);
    }
    parse_number(part, original)
}

fn parse_number(part: &str, original: &str) -> Result<f64> {
    match part.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CoreError::invalid_input(
            "duration",
            format!("'{original}' is not a duration (use 1.5 or 1:30)"),
        )),
    }
}
