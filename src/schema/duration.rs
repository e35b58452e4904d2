//! Human-readable duration parsing for index expiry.
//!
//! Grammar: `<number> [unit]`, unit case-insensitive, optional spaces between.
//! Units: ms, s, m, h, d, w, y and their long forms (`secs`, `minutes`,
//! `2 days`, `1.5 hours`). A bare number is milliseconds.

use std::sync::OnceLock;

use regex::Regex;

use super::calendar;
use super::errors::{FieldError, FieldResult};

const SECOND: f64 = 1000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const YEAR: f64 = DAY * 365.25;

/// Longest input considered; anything longer is rejected outright.
const MAX_INPUT_LEN: usize = 100;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        calendar::literal_regex(
            r"(?i)^(-?(?:\d+)?\.?\d+) *(milliseconds?|msecs?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y)?$",
        )
    })
}

fn unit_millis(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "years" | "year" | "yrs" | "yr" | "y" => YEAR,
        "weeks" | "week" | "w" => WEEK,
        "days" | "day" | "d" => DAY,
        "hours" | "hour" | "hrs" | "hr" | "h" => HOUR,
        "minutes" | "minute" | "mins" | "min" | "m" => MINUTE,
        "seconds" | "second" | "secs" | "sec" | "s" => SECOND,
        _ => 1.0,
    }
}

/// Parses a duration string into milliseconds.
pub fn parse_millis(text: &str) -> FieldResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_INPUT_LEN {
        return Err(FieldError::config(format!("invalid duration '{}'", text)));
    }

    let caps = duration_pattern()
        .captures(trimmed)
        .ok_or_else(|| FieldError::config(format!("invalid duration '{}'", text)))?;

    let amount: f64 = caps[1]
        .parse()
        .map_err(|_| FieldError::config(format!("invalid duration amount in '{}'", text)))?;
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("ms");

    Ok(amount * unit_millis(unit))
}

/// Parses a duration string into whole seconds, rounding to the nearest second.
pub fn parse_seconds(text: &str) -> FieldResult<i64> {
    let millis = parse_millis(text)?;
    whole_seconds(millis / SECOND)
}

/// Rounds `seconds` to the nearest whole second. Non-finite values and
/// values outside the `i64` range are rejected.
pub fn whole_seconds(seconds: f64) -> FieldResult<i64> {
    let rounded = seconds.round();
    // i64::MAX as f64 is 2^63, one past the largest i64
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(FieldError::config(format!("duration out of range: {} seconds", seconds)));
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_units() {
        assert_eq!(parse_seconds("10s").unwrap(), 10);
        assert_eq!(parse_seconds("30m").unwrap(), 1800);
        assert_eq!(parse_seconds("24h").unwrap(), 86_400);
        assert_eq!(parse_seconds("7d").unwrap(), 604_800);
        assert_eq!(parse_seconds("1w").unwrap(), 604_800);
        assert_eq!(parse_seconds("1y").unwrap(), 31_557_600);
    }

    #[test]
    fn test_fractional_and_long_forms() {
        assert_eq!(parse_seconds("1.5h").unwrap(), 5400);
        assert_eq!(parse_seconds("2 days").unwrap(), 172_800);
        assert_eq!(parse_seconds("1.5 Hours").unwrap(), 5400);
        assert_eq!(parse_seconds(".5m").unwrap(), 30);
    }

    #[test]
    fn test_bare_number_is_millis() {
        assert_eq!(parse_millis("2500").unwrap(), 2500.0);
        assert_eq!(parse_seconds("2500").unwrap(), 3);
        assert_eq!(parse_seconds("499ms").unwrap(), 0);
    }

    #[test]
    fn test_negative_durations_parse() {
        assert_eq!(parse_seconds("-1h").unwrap(), -3600);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_millis("").is_err());
        assert!(parse_millis("soon").is_err());
        assert!(parse_millis("10 fortnights").is_err());
        assert!(parse_millis(&"1".repeat(101)).is_err());
    }

    #[test]
    fn test_duration_pattern_compiles() {
        assert!(duration_pattern().is_match("1.5 hours"));
    }

    #[test]
    fn test_out_of_range_seconds_rejected() {
        assert!(parse_seconds(&format!("{}y", "9".repeat(40))).is_err());
        assert!(whole_seconds(1e300).is_err());
        assert!(whole_seconds(-1e300).is_err());
        assert!(whole_seconds(f64::NAN).is_err());
        assert_eq!(whole_seconds(1e15).unwrap(), 1_000_000_000_000_000);
    }
}
