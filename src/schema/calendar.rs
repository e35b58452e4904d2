//! Calendar text and epoch-millisecond construction for date values.
//!
//! Accepted text forms:
//! - ISO 8601 date / date-time (`2020-01-01`, `2020-01-01T10:00:00.123+02:00`,
//!   extended years `+010000-01-01`), with `T` or a space as separator
//! - Bare years (`2020`, `-44`)
//! - RFC 2822 (`Wed, 01 Jan 2020 10:00:00 +0000`)
//! - Slash forms (`2020/01/31`, `01/31/2020`, optionally with `HH:MM[:SS]`)
//!
//! Text without an explicit offset is read as UTC.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Compiles a pattern written as a string literal in this crate. Every such
/// pattern is compiled by the unit tests, so a failure here is a bug.
pub(crate) fn literal_regex(pattern: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid literal pattern {:?}: {}", pattern, e))
}

fn iso_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        literal_regex(
            r"^([+-]\d{6}|\d{4})(?:-(\d{2})(?:-(\d{2}))?)?(?:[Tt ](\d{2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?)?\s*([Zz]|[+-]\d{2}:?\d{2})?$",
        )
    })
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| literal_regex(r"^[+-]?\d{1,6}$"))
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        literal_regex(r"^[+-]?(?:(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?|Infinity)$")
    })
}

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| literal_regex(r"^0[xX][0-9a-fA-F]+$"))
}

const SLASH_DATE_TIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const SLASH_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%m/%d/%Y"];

/// Latest calendar year the canonical date type can hold.
pub fn max_year() -> i32 {
    NaiveDate::MAX.year()
}

/// Earliest calendar year the canonical date type can hold.
pub fn min_year() -> i32 {
    NaiveDate::MIN.year()
}

/// True when `n` cannot be a calendar year of the canonical date type.
pub fn outside_year_range(n: f64) -> bool {
    n > f64::from(max_year()) || n < f64::from(min_year())
}

/// Builds a date from epoch milliseconds. Fractions truncate toward zero.
///
/// Returns `None` for non-finite or unrepresentable inputs.
pub fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let whole = millis.trunc();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(whole as i64).single()
}

/// Parses text that is entirely numeric-looking (surrounding whitespace allowed).
///
/// Accepts decimal, exponent, hexadecimal and `Infinity` forms.
pub fn numeric_value(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if hex_pattern().is_match(trimmed) {
        return u64::from_str_radix(&trimmed[2..], 16).ok().map(|n| n as f64);
    }
    if !numeric_pattern().is_match(trimmed) {
        return None;
    }
    match trimmed.trim_start_matches('+') {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        digits => digits.parse::<f64>().ok(),
    }
}

/// Parses calendar text into a UTC date. Returns `None` when the text does
/// not describe a representable point in time.
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(parsed) = parse_iso(trimmed) {
        return Some(parsed);
    }
    if year_pattern().is_match(trimmed) {
        return parse_year(trimmed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in SLASH_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in SLASH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    None
}

fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    let caps = iso_pattern().captures(text)?;

    let year_text = caps.get(1)?.as_str();
    // A signed zero extended year is not a valid ISO year.
    if year_text == "-000000" {
        return None;
    }
    let year: i32 = year_text.trim_start_matches('+').parse().ok()?;

    let field = |index: usize, default: u32| -> Option<u32> {
        match caps.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };
    let month = field(2, 1)?;
    let day = field(3, 1)?;
    let hour = field(4, 0)?;
    let minute = field(5, 0)?;
    let second = field(6, 0)?;
    let millis = match caps.get(7) {
        Some(m) => {
            let digits: String = m.as_str().chars().chain(std::iter::repeat('0')).take(3).collect();
            digits.parse().ok()?
        }
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    // 24:00 is the midnight that ends the day; nothing may follow it.
    let naive = if hour == 24 {
        if minute != 0 || second != 0 || millis != 0 {
            return None;
        }
        date.succ_opt()?.and_hms_opt(0, 0, 0)?
    } else {
        date.and_hms_milli_opt(hour, minute, second, millis)?
    };

    let offset = match caps.get(8) {
        Some(m) => parse_offset(m.as_str())?,
        None => FixedOffset::east_opt(0)?,
    };
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_year(text: &str) -> Option<DateTime<Utc>> {
    let year: i32 = text.trim_start_matches('+').parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).single().unwrap()
    }

    #[test]
    fn test_iso_date_only_is_utc_midnight() {
        assert_eq!(parse("2020-01-01"), Some(utc(2020, 1, 1, 0, 0, 0)));
        assert_eq!(parse("2020-06"), Some(utc(2020, 6, 1, 0, 0, 0)));
    }

    #[test]
    fn test_iso_with_offset() {
        assert_eq!(parse("2020-01-01T10:00:00+02:00"), Some(utc(2020, 1, 1, 8, 0, 0)));
        assert_eq!(parse("2020-01-01T10:00:00Z"), Some(utc(2020, 1, 1, 10, 0, 0)));
        assert_eq!(parse("2020-01-01 10:00-0130"), Some(utc(2020, 1, 1, 11, 30, 0)));
    }

    #[test]
    fn test_iso_fraction_truncates_to_millis() {
        let parsed = parse("2020-01-01T00:00:00.123456Z").unwrap();
        assert_eq!(parsed.nanosecond(), 123_000_000);
        let short = parse("2020-01-01T00:00:00.5Z").unwrap();
        assert_eq!(short.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_end_of_day_midnight_rolls_over() {
        assert_eq!(parse("2020-12-31T24:00:00"), Some(utc(2021, 1, 1, 0, 0, 0)));
        assert_eq!(parse("2020-02-28T24:00:00.000Z"), Some(utc(2020, 2, 29, 0, 0, 0)));
        assert_eq!(parse("2020-01-01T24:00+01:00"), Some(utc(2020, 1, 1, 23, 0, 0)));
        assert_eq!(parse("2020-01-01T24:00:01"), None);
        assert_eq!(parse("2020-01-01T24:00:00.001"), None);
        assert_eq!(parse("2020-01-01T25:00:00"), None);
    }

    #[test]
    fn test_literal_patterns_compile() {
        for pattern in [iso_pattern(), year_pattern(), numeric_pattern(), hex_pattern()] {
            assert!(!pattern.as_str().is_empty());
        }
    }

    #[test]
    fn test_extended_years() {
        assert_eq!(parse("+010000-01-01"), Some(utc(10000, 1, 1, 0, 0, 0)));
        assert_eq!(parse("-000000-01-01"), None);
    }

    #[test]
    fn test_bare_years() {
        assert_eq!(parse("2020"), Some(utc(2020, 1, 1, 0, 0, 0)));
        assert_eq!(parse("12345"), Some(utc(12345, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse("Wed, 01 Jan 2020 10:00:00 +0000"),
            Some(utc(2020, 1, 1, 10, 0, 0))
        );
    }

    #[test]
    fn test_slash_forms() {
        assert_eq!(parse("2020/01/31"), Some(utc(2020, 1, 31, 0, 0, 0)));
        assert_eq!(parse("01/31/2020 13:45"), Some(utc(2020, 1, 31, 13, 45, 0)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse("2020-13-01"), None);
        assert_eq!(parse("2020-02-30"), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("42"), Some(42.0));
        assert_eq!(numeric_value(" -1.5e3 "), Some(-1500.0));
        assert_eq!(numeric_value("0x10"), Some(16.0));
        assert_eq!(numeric_value("Infinity"), Some(f64::INFINITY));
        assert_eq!(numeric_value("2020-01-01"), None);
        assert_eq!(numeric_value("12abc"), None);
    }

    #[test]
    fn test_year_range_follows_chrono() {
        assert!(outside_year_range(f64::from(max_year()) + 1.0));
        assert!(outside_year_range(f64::from(min_year()) - 1.0));
        assert!(!outside_year_range(2020.0));
        assert!(!outside_year_range(f64::from(max_year())));
    }

    #[test]
    fn test_from_epoch_millis() {
        assert_eq!(from_epoch_millis(0.0), Some(utc(1970, 1, 1, 0, 0, 0)));
        assert_eq!(from_epoch_millis(1999.9).map(|d| d.timestamp_millis()), Some(1999));
        assert_eq!(from_epoch_millis(-1.5).map(|d| d.timestamp_millis()), Some(-1));
        assert_eq!(from_epoch_millis(f64::NAN), None);
        assert_eq!(from_epoch_millis(f64::INFINITY), None);
        assert_eq!(from_epoch_millis(1e300), None);
    }
}
