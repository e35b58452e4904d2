//! Date field options.
//!
//! Options arrive as JSON, either inline or from a file:
//!
//! ```json
//! {
//!   "required": true,
//!   "min": "2020-01-01",
//!   "max": { "value": "now", "message": "{PATH} cannot be in the future" },
//!   "expires": "7d",
//!   "index": true
//! }
//! ```
//!
//! `"now"` as a bound value installs a deferred current-time bound.
//! Unknown keys are rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::candidate::Candidate;
use super::date::{DateField, Expiry};
use super::errors::{FieldError, FieldResult};
use super::validators::Bound;

/// Keyword selecting the deferred current-time bound
pub const NOW_KEYWORD: &str = "now";

/// `required: true` or `required: "custom message"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredOption {
    Flag(bool),
    Message(String),
}

impl Default for RequiredOption {
    fn default() -> Self {
        RequiredOption::Flag(false)
    }
}

/// A bound value, optionally with a custom message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundOption {
    WithMessage { value: Value, message: String },
    Value(Value),
}

impl BoundOption {
    fn parts(&self) -> (&Value, Option<&str>) {
        match self {
            BoundOption::WithMessage { value, message } => (value, Some(message.as_str())),
            BoundOption::Value(value) => (value, None),
        }
    }

    /// Resolves the JSON value into a bound.
    pub fn to_bound(&self) -> Bound {
        match self.parts().0 {
            Value::String(s) if s == NOW_KEYWORD => Bound::Now,
            other => Bound::Literal(Candidate::from_json(other)),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.parts().1
    }
}

/// `expires: 3600` or `expires: "1h"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiresOption {
    Seconds(f64),
    Duration(String),
}

impl From<&ExpiresOption> for Expiry {
    fn from(option: &ExpiresOption) -> Self {
        match option {
            ExpiresOption::Seconds(s) => Expiry::Seconds(*s),
            ExpiresOption::Duration(text) => Expiry::Text(text.clone()),
        }
    }
}

/// Recognized options of a date field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateFieldOptions {
    #[serde(default)]
    pub required: RequiredOption,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<BoundOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<BoundOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<ExpiresOption>,

    #[serde(default)]
    pub index: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub sparse: bool,
}

impl DateFieldOptions {
    /// Parses options from a JSON value
    pub fn from_json(value: &Value) -> FieldResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| FieldError::config(format!("invalid date field options: {}", e)))
    }

    /// Load options from a JSON file
    pub fn load(path: &Path) -> FieldResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FieldError::config(format!("failed to read options '{}': {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            FieldError::config(format!("invalid options JSON in '{}': {}", path.display(), e))
        })?;
        Self::from_json(&value)
    }

    /// Applies the options to `field` through its setters.
    pub fn apply(&self, field: &mut DateField) -> FieldResult<()> {
        match &self.required {
            RequiredOption::Flag(on) => {
                field.required(*on);
            }
            RequiredOption::Message(message) => {
                field.required_with_message(message.as_str());
            }
        }

        if let Some(min) = &self.min {
            match min.message() {
                Some(message) => field.min_with_message(min.to_bound(), message),
                None => field.min(min.to_bound()),
            };
        }
        if let Some(max) = &self.max {
            match max.message() {
                Some(message) => field.max_with_message(max.to_bound(), message),
                None => field.max(max.to_bound()),
            };
        }

        if let Some(expires) = &self.expires {
            field.expires(Expiry::from(expires))?;
        }
        if self.index {
            field.index(true);
        }
        if self.unique {
            field.unique(true);
        }
        if self.sparse {
            field.sparse(true);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validators::ValidatorKind;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = DateFieldOptions::from_json(&json!({})).unwrap();
        assert_eq!(options, DateFieldOptions::default());
        assert_eq!(options.required, RequiredOption::Flag(false));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = DateFieldOptions::from_json(&json!({"minimum": "2020"})).unwrap_err();
        assert!(matches!(err, FieldError::Config { .. }));
    }

    #[test]
    fn test_bound_shapes() {
        let options = DateFieldOptions::from_json(&json!({
            "min": "now",
            "max": {"value": "2030-01-01", "message": "too late"}
        }))
        .unwrap();
        assert!(matches!(options.min.as_ref().unwrap().to_bound(), Bound::Now));
        let max = options.max.as_ref().unwrap();
        assert_eq!(max.message(), Some("too late"));
        assert!(matches!(max.to_bound(), Bound::Literal(Candidate::Text(ref s)) if s == "2030-01-01"));
    }

    #[test]
    fn test_numeric_bound_is_literal() {
        let options = DateFieldOptions::from_json(&json!({"min": 0})).unwrap();
        assert!(options.min.unwrap().to_bound().is_unset());
    }

    #[test]
    fn test_apply_installs_validators() {
        let options = DateFieldOptions::from_json(&json!({
            "required": "when is required",
            "min": "2020-01-01",
            "max": "now",
            "expires": "24h",
            "index": true
        }))
        .unwrap();
        let field = DateField::from_options("when", &options).unwrap();
        let kinds: Vec<_> = field.validators().iter().map(|e| e.kind().clone()).collect();
        assert_eq!(kinds, vec![ValidatorKind::Required, ValidatorKind::Min, ValidatorKind::Max]);
        let spec = field.index_spec().unwrap();
        assert_eq!(spec.expires(), Some(86_400));
        assert_eq!(spec.get("index"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_apply_rejects_bad_expiry() {
        let options = DateFieldOptions::from_json(&json!({"expires": "whenever"})).unwrap();
        assert!(DateField::from_options("when", &options).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("when.json");
        fs::write(&path, r#"{"expires": 3600, "sparse": true}"#).unwrap();
        let options = DateFieldOptions::load(&path).unwrap();
        assert_eq!(options.expires, Some(ExpiresOption::Seconds(3600.0)));
        assert!(options.sparse);

        let missing = DateFieldOptions::load(&dir.path().join("absent.json"));
        assert!(missing.is_err());
    }
}
