//! Field error types and error codes
//!
//! Error codes:
//! - AERO_FIELD_CAST_FAILED (REJECT)
//! - AERO_FIELD_VALIDATION_FAILED (REJECT)
//! - AERO_FIELD_UNSUPPORTED_OPERATOR (FATAL)
//! - AERO_FIELD_CONFIG_INVALID (FATAL)

use std::fmt;

use thiserror::Error;

use super::messages::{self, MessageTemplate, Placeholder};

/// Severity levels for field errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Offending value rejected, caller may retry with other data
    Reject,
    /// Programmer or schema error, must not be swallowed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Field-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorCode {
    /// Value could not be cast to the field kind
    AeroFieldCastFailed,
    /// Value was cast but a validator rejected it
    AeroFieldValidationFailed,
    /// Query operator not supported by the field kind
    AeroFieldUnsupportedOperator,
    /// Field options are malformed
    AeroFieldConfigInvalid,
}

impl FieldErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorCode::AeroFieldCastFailed => "AERO_FIELD_CAST_FAILED",
            FieldErrorCode::AeroFieldValidationFailed => "AERO_FIELD_VALIDATION_FAILED",
            FieldErrorCode::AeroFieldUnsupportedOperator => "AERO_FIELD_UNSUPPORTED_OPERATOR",
            FieldErrorCode::AeroFieldConfigInvalid => "AERO_FIELD_CONFIG_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            FieldErrorCode::AeroFieldCastFailed | FieldErrorCode::AeroFieldValidationFailed => {
                Severity::Reject
            }
            FieldErrorCode::AeroFieldUnsupportedOperator | FieldErrorCode::AeroFieldConfigInvalid => {
                Severity::Fatal
            }
        }
    }
}

impl fmt::Display for FieldErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by field casting, query casting and field configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The input could not be turned into a value of the field kind.
    #[error("{}", cast_message(.kind, .value, .path))]
    Cast {
        kind: &'static str,
        value: String,
        path: String,
    },

    /// The query operator has no conditional handler for this field kind.
    #[error("Can't use {operator} with {kind}.")]
    Usage { operator: String, kind: &'static str },

    #[error("Invalid field configuration: {message}")]
    Config { message: String },
}

// The offending value is substituted last so its text is never re-scanned.
fn cast_message(kind: &str, value: &str, path: &str) -> String {
    MessageTemplate::new(messages::CAST_FAILED).render(&[
        (Placeholder::Kind, kind),
        (Placeholder::Path, path),
        (Placeholder::Value, value),
    ])
}

impl FieldError {
    /// Create a cast error for the given field kind
    pub fn cast(kind: &'static str, value: impl fmt::Display, path: impl Into<String>) -> Self {
        FieldError::Cast {
            kind,
            value: value.to_string(),
            path: path.into(),
        }
    }

    /// Create an unsupported operator error
    pub fn usage(operator: impl Into<String>, kind: &'static str) -> Self {
        FieldError::Usage {
            operator: operator.into(),
            kind,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        FieldError::Config {
            message: message.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> FieldErrorCode {
        match self {
            FieldError::Cast { .. } => FieldErrorCode::AeroFieldCastFailed,
            FieldError::Usage { .. } => FieldErrorCode::AeroFieldUnsupportedOperator,
            FieldError::Config { .. } => FieldErrorCode::AeroFieldConfigInvalid,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, FieldError::Cast { .. })
    }
}

/// Result type for field operations
pub type FieldResult<T> = Result<T, FieldError>;

/// A per-field validation failure as surfaced to the document layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field path (e.g., "event.starts_at")
    path: String,
    /// Validator kind that failed ("min", "max", "required", "cast", ...)
    kind: String,
    /// Display form of the offending value
    value: String,
    /// Rendered message
    message: String,
}

impl ValidationError {
    pub fn new(
        path: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Wrap a cast failure raised while validating `path`
    pub fn from_field_error(path: impl Into<String>, value: impl Into<String>, err: &FieldError) -> Self {
        Self::new(path, "cast", value, err.to_string())
    }

    /// Returns the error code
    pub fn code(&self) -> FieldErrorCode {
        FieldErrorCode::AeroFieldValidationFailed
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code().severity(),
            self.code().code(),
            self.message
        )
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FieldErrorCode::AeroFieldCastFailed.code(), "AERO_FIELD_CAST_FAILED");
        assert_eq!(
            FieldErrorCode::AeroFieldUnsupportedOperator.code(),
            "AERO_FIELD_UNSUPPORTED_OPERATOR"
        );
        assert_eq!(FieldErrorCode::AeroFieldConfigInvalid.code(), "AERO_FIELD_CONFIG_INVALID");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(FieldError::cast("date", "x", "at").severity(), Severity::Reject);
        assert!(FieldError::usage("$near", "date").is_fatal());
        assert!(FieldError::config("bad").is_fatal());
    }

    #[test]
    fn test_cast_error_display_carries_context() {
        let err = FieldError::cast("date", "not a date", "starts_at");
        let display = err.to_string();
        assert!(display.contains("date"));
        assert!(display.contains("not a date"));
        assert!(display.contains("starts_at"));
    }

    #[test]
    fn test_cast_error_renders_catalog_template() {
        let err = FieldError::cast("date", "tomorrow", "starts_at");
        assert_eq!(
            err.to_string(),
            "Cast to date failed for value \"tomorrow\" at path \"starts_at\""
        );

        // placeholder text inside the value is left alone
        let err = FieldError::cast("date", "{PATH}", "starts_at");
        assert_eq!(
            err.to_string(),
            "Cast to date failed for value \"{PATH}\" at path \"starts_at\""
        );
    }

    #[test]
    fn test_usage_error_names_operator() {
        let err = FieldError::usage("$regex", "date");
        assert_eq!(err.to_string(), "Can't use $regex with date.");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("starts_at", "min", "2001-01-01", "too early");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("AERO_FIELD_VALIDATION_FAILED"));
        assert!(display.contains("too early"));
    }
}
