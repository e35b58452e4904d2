//! Default validation messages and placeholder rendering.
//!
//! Templates embed `{PATH}`, `{VALUE}`, `{KIND}`, `{MIN}` and `{MAX}` tokens.
//! Bound tokens are filled when a validator is installed; path and value
//! are filled when a failure is reported.

use std::fmt;

pub const DATE_MIN: &str = "Path `{PATH}` ({VALUE}) is before minimum allowed value ({MIN}).";
pub const DATE_MAX: &str = "Path `{PATH}` ({VALUE}) is after maximum allowed value ({MAX}).";
pub const REQUIRED: &str = "Path `{PATH}` is required.";
pub const CAST_FAILED: &str = "Cast to {KIND} failed for value \"{VALUE}\" at path \"{PATH}\"";

/// Rendered text for a deferred "current time" bound.
pub const NOW_MARKER: &str = "now";

/// Rendered text for a bound computed by a caller-supplied function.
pub const COMPUTED_MARKER: &str = "<computed>";

/// Substitutable tokens in a message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Path,
    Value,
    Kind,
    Min,
    Max,
}

impl Placeholder {
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Path => "{PATH}",
            Placeholder::Value => "{VALUE}",
            Placeholder::Kind => "{KIND}",
            Placeholder::Min => "{MIN}",
            Placeholder::Max => "{MAX}",
        }
    }
}

/// A message with zero or more unfilled placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Replaces the first occurrence of `placeholder`, leaving others intact.
    pub fn fill(&self, placeholder: Placeholder, value: &str) -> Self {
        Self(self.0.replacen(placeholder.token(), value, 1))
    }

    /// Replaces every listed placeholder.
    pub fn render(&self, values: &[(Placeholder, &str)]) -> String {
        values
            .iter()
            .fold(self.0.clone(), |text, (placeholder, value)| {
                text.replace(placeholder.token(), value)
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageTemplate {
    fn from(text: String) -> Self {
        Self(text)
    }
}
