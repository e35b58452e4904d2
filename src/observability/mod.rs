//! Observability for aerodate
//!
//! Structured JSON-line logging of field lifecycle and per-value events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on casting or validation
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerodate::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(Event::FieldDeclared, &[("path", "starts_at")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::FieldDeclared, &[("path", "starts_at")]);
        log_event(Event::CastRejected, &[]);
    }
}
