//! Observable events emitted by field types.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Field type constructed
    FieldDeclared,
    /// Min / max validator installed
    BoundInstalled,
    /// Min / max validator removed
    BoundRemoved,
    /// Index expiry set
    ExpiresSet,
    /// Value failed to cast
    CastRejected,
    /// Query used an operator the field kind does not support
    QueryOperatorRejected,
    /// Cast value failed a validator
    ValidationFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::FieldDeclared => "FIELD_DECLARED",
            Event::BoundInstalled => "BOUND_INSTALLED",
            Event::BoundRemoved => "BOUND_REMOVED",
            Event::ExpiresSet => "EXPIRES_SET",
            Event::CastRejected => "CAST_REJECTED",
            Event::QueryOperatorRejected => "QUERY_OPERATOR_REJECTED",
            Event::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::FieldDeclared | Event::BoundInstalled | Event::BoundRemoved | Event::ExpiresSet => {
                Severity::Info
            }
            Event::CastRejected | Event::ValidationFailed => Severity::Trace,
            Event::QueryOperatorRejected => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::FieldDeclared.as_str(), "FIELD_DECLARED");
        assert_eq!(Event::QueryOperatorRejected.to_string(), "QUERY_OPERATOR_REJECTED");
    }

    #[test]
    fn test_per_value_events_are_trace() {
        assert_eq!(Event::CastRejected.severity(), Severity::Trace);
        assert_eq!(Event::ValidationFailed.severity(), Severity::Trace);
        assert_eq!(Event::QueryOperatorRejected.severity(), Severity::Warn);
        assert_eq!(Event::BoundInstalled.severity(), Severity::Info);
    }
}
