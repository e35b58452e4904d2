//! Raw input representations accepted by field casting.
//!
//! A `Candidate` is whatever the caller hands to a field before casting:
//! JSON scalars, already-canonical dates, or wrapper types that know how to
//! reduce themselves to a time value (`TimeCoercion`).

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

/// Primitive form a `TimeCoercion` reduces to.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Milliseconds since the Unix epoch
    Millis(f64),
    /// Text handed to the calendar parser
    Text(String),
}

/// Capability for types that define their own time-value coercion.
pub trait TimeCoercion: fmt::Debug + Send + Sync {
    fn to_primitive(&self) -> Primitive;
}

impl TimeCoercion for DateTime<FixedOffset> {
    fn to_primitive(&self) -> Primitive {
        Primitive::Millis(self.timestamp_millis() as f64)
    }
}

impl TimeCoercion for NaiveDateTime {
    fn to_primitive(&self) -> Primitive {
        Primitive::Millis(Utc.from_utc_datetime(self).timestamp_millis() as f64)
    }
}

impl TimeCoercion for NaiveDate {
    fn to_primitive(&self) -> Primitive {
        match self.and_hms_opt(0, 0, 0) {
            Some(midnight) => midnight.to_primitive(),
            None => Primitive::Millis(f64::NAN),
        }
    }
}

impl TimeCoercion for SystemTime {
    fn to_primitive(&self) -> Primitive {
        let millis = match self.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_millis() as f64,
            Err(before) => -(before.duration().as_millis() as f64),
        };
        Primitive::Millis(millis)
    }
}

/// An uncast input value.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// Value not supplied at all
    Undefined,
    /// Explicit null
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Already-canonical temporal value
    Date(DateTime<Utc>),
    /// Wrapper exposing a time-value coercion
    Coercible(Arc<dyn TimeCoercion>),
    List(Vec<Candidate>),
    Object(Map<String, Value>),
}

impl Candidate {
    /// Wrap a type implementing `TimeCoercion`
    pub fn coercible(value: impl TimeCoercion + 'static) -> Self {
        Candidate::Coercible(Arc::new(value))
    }

    /// Converts a JSON value into a candidate.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Candidate::Null,
            Value::Bool(b) => Candidate::Bool(*b),
            Value::Number(n) => Candidate::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Candidate::Text(s.clone()),
            Value::Array(items) => Candidate::List(items.iter().map(Candidate::from_json).collect()),
            Value::Object(map) => Candidate::Object(map.clone()),
        }
    }

    /// Explicit "no value": null, undefined or the empty string.
    pub fn is_nullish(&self) -> bool {
        match self {
            Candidate::Undefined | Candidate::Null => true,
            Candidate::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Falsy inputs switch a bound off instead of installing it.
    pub fn is_falsy(&self) -> bool {
        match self {
            Candidate::Bool(b) => !b,
            Candidate::Number(n) => *n == 0.0 || n.is_nan(),
            other => other.is_nullish(),
        }
    }

    /// Returns the kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Candidate::Undefined => "undefined",
            Candidate::Null => "null",
            Candidate::Bool(_) => "boolean",
            Candidate::Number(_) => "number",
            Candidate::Text(_) => "string",
            Candidate::Date(_) => "date",
            Candidate::Coercible(_) => "coercible",
            Candidate::List(_) => "array",
            Candidate::Object(_) => "object",
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Undefined => write!(f, "undefined"),
            Candidate::Null => write!(f, "null"),
            Candidate::Bool(b) => write!(f, "{}", b),
            Candidate::Number(n) => write!(f, "{}", format_number(*n)),
            Candidate::Text(s) => write!(f, "{}", s),
            Candidate::Date(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Candidate::Coercible(inner) => match inner.to_primitive() {
                Primitive::Millis(ms) => write!(f, "{}", format_number(ms)),
                Primitive::Text(s) => write!(f, "{}", s),
            },
            Candidate::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| if item.is_nullish() { String::new() } else { item.to_string() })
                    .collect();
                write!(f, "{}", parts.join(","))
            }
            Candidate::Object(map) => {
                let rendered = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                write!(f, "{}", rendered)
            }
        }
    }
}

impl From<bool> for Candidate {
    fn from(value: bool) -> Self {
        Candidate::Bool(value)
    }
}

impl From<f64> for Candidate {
    fn from(value: f64) -> Self {
        Candidate::Number(value)
    }
}

impl From<i64> for Candidate {
    fn from(value: i64) -> Self {
        Candidate::Number(value as f64)
    }
}

impl From<i32> for Candidate {
    fn from(value: i32) -> Self {
        Candidate::Number(value as f64)
    }
}

impl From<u64> for Candidate {
    fn from(value: u64) -> Self {
        Candidate::Number(value as f64)
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Candidate::Text(value.to_string())
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Candidate::Text(value)
    }
}

impl From<DateTime<Utc>> for Candidate {
    fn from(value: DateTime<Utc>) -> Self {
        Candidate::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Candidate {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Candidate::coercible(value)
    }
}

impl From<NaiveDateTime> for Candidate {
    fn from(value: NaiveDateTime) -> Self {
        Candidate::coercible(value)
    }
}

impl From<NaiveDate> for Candidate {
    fn from(value: NaiveDate) -> Self {
        Candidate::coercible(value)
    }
}

impl From<SystemTime> for Candidate {
    fn from(value: SystemTime) -> Self {
        Candidate::coercible(value)
    }
}

impl From<Vec<Candidate>> for Candidate {
    fn from(value: Vec<Candidate>) -> Self {
        Candidate::List(value)
    }
}

impl From<Value> for Candidate {
    fn from(value: Value) -> Self {
        Candidate::from_json(&value)
    }
}

impl From<&Value> for Candidate {
    fn from(value: &Value) -> Self {
        Candidate::from_json(value)
    }
}

impl<T: Into<Candidate>> From<Option<T>> for Candidate {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Candidate::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nullish_inputs() {
        assert!(Candidate::Null.is_nullish());
        assert!(Candidate::Undefined.is_nullish());
        assert!(Candidate::from("").is_nullish());
        assert!(!Candidate::from(" ").is_nullish());
        assert!(!Candidate::from(0).is_nullish());
    }

    #[test]
    fn test_falsy_inputs() {
        assert!(Candidate::from(false).is_falsy());
        assert!(Candidate::from(0).is_falsy());
        assert!(Candidate::Number(f64::NAN).is_falsy());
        assert!(!Candidate::from(true).is_falsy());
        assert!(!Candidate::from("2020-01-01").is_falsy());
    }

    #[test]
    fn test_from_json() {
        assert!(matches!(Candidate::from(json!(null)), Candidate::Null));
        assert!(matches!(Candidate::from(json!(true)), Candidate::Bool(true)));
        assert!(matches!(Candidate::from(json!(1000)), Candidate::Number(n) if n == 1000.0));
        assert!(matches!(Candidate::from(json!(["a"])), Candidate::List(ref v) if v.len() == 1));
        assert!(matches!(Candidate::from(json!({"a": 1})), Candidate::Object(_)));
    }

    #[test]
    fn test_naive_date_coerces_to_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(date.to_primitive(), Primitive::Millis(86_400_000.0));
    }

    #[test]
    fn test_system_time_before_epoch() {
        let before = UNIX_EPOCH - std::time::Duration::from_millis(1500);
        assert_eq!(before.to_primitive(), Primitive::Millis(-1500.0));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Candidate::from(1000).to_string(), "1000");
        assert_eq!(Candidate::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(
            Candidate::List(vec![Candidate::from("2020"), Candidate::Null, Candidate::from(3)]).to_string(),
            "2020,,3"
        );
        let epoch = Utc.timestamp_millis_opt(0).single().unwrap();
        assert_eq!(Candidate::from(epoch).to_string(), "1970-01-01T00:00:00.000Z");
    }
}
