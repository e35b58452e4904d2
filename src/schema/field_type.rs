//! Base capability shared by every field kind, plus dispatch on the
//! declared kind.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

use super::candidate::Candidate;
use super::date::{format_date, DateField, DATE_KIND};
use super::errors::{FieldError, FieldResult};
use super::options::DateFieldOptions;
use super::query::{ConditionalHandler, QueryOperand, QueryOperator};
use super::validators::ValidatorChain;
use crate::observability::{log_event, Event};

/// Casting, presence and query-casting contract of a field kind.
pub trait SchemaType: Sized {
    /// Canonical in-memory value of the kind
    type Value: Clone + fmt::Debug;

    /// Kind tag used in errors ("date", ...)
    fn kind(&self) -> &'static str;

    fn path(&self) -> &str;

    /// Normalizes a raw input. `Ok(None)` means "no value".
    fn cast(&self, value: &Candidate) -> FieldResult<Option<Self::Value>>;

    /// True iff `value` is already a genuine instance of the kind.
    fn check_required(&self, value: &Candidate) -> bool;

    fn validators(&self) -> &ValidatorChain<Self::Value>;

    fn conditional_handlers(&self) -> &BTreeMap<QueryOperator, ConditionalHandler<Self>>;

    /// Casts a query operand. Without an operator the operand is cast as
    /// a plain value; with one, the operator's conditional handler decides.
    fn cast_for_query(
        &self,
        operator: Option<&str>,
        value: &Candidate,
    ) -> FieldResult<QueryOperand<Self::Value>> {
        let Some(token) = operator else {
            return Ok(QueryOperand::Value(self.cast(value)?));
        };

        let handler = QueryOperator::from_token(token)
            .and_then(|op| self.conditional_handlers().get(&op))
            .ok_or_else(|| {
                log_event(
                    Event::QueryOperatorRejected,
                    &[("kind", self.kind()), ("operator", token), ("path", self.path())],
                );
                FieldError::usage(token, self.kind())
            })?;

        handler(self, value)
    }
}

/// A field of any supported kind.
#[derive(Debug, Clone)]
pub enum SchemaField {
    Date(DateField),
}

impl SchemaField {
    /// Builds a field of the declared `kind` from JSON options.
    pub fn from_options(kind: &str, path: &str, options: &Value) -> FieldResult<Self> {
        match kind {
            "date" | "Date" => {
                let options = DateFieldOptions::from_json(options)?;
                Ok(SchemaField::Date(DateField::from_options(path, &options)?))
            }
            other => Err(FieldError::config(format!("unknown field kind '{}'", other))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaField::Date(_) => DATE_KIND,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            SchemaField::Date(field) => field.path(),
        }
    }

    pub fn as_date(&self) -> Option<&DateField> {
        match self {
            SchemaField::Date(field) => Some(field),
        }
    }

    /// Casts and renders the result as JSON (`null` for no value).
    pub fn cast_to_json(&self, value: &Candidate) -> FieldResult<Value> {
        match self {
            SchemaField::Date(field) => Ok(field.cast(value)?.map_or(Value::Null, |dt| json!(format_date(&dt)))),
        }
    }

    /// Query-casts and renders the operand as JSON.
    pub fn cast_for_query_to_json(&self, operator: Option<&str>, value: &Candidate) -> FieldResult<Value> {
        match self {
            SchemaField::Date(field) => {
                let operand = SchemaType::cast_for_query(field, operator, value)?.map(|dt| format_date(&dt));
                serde_json::to_value(&operand).map_err(|e| FieldError::config(e.to_string()))
            }
        }
    }
}
