//! Date field type.
//!
//! Casting precedence (first match wins):
//!
//! 1. null, undefined or `""` -> no value
//! 2. an already-canonical date -> returned unchanged
//! 3. booleans -> rejected, never read as 0 / 1 epoch milliseconds
//! 4. numbers -> epoch milliseconds
//! 5. numeric text outside the calendar-year range -> epoch milliseconds
//! 6. text and `TimeCoercion` wrappers -> their primitive (calendar text or
//!    epoch milliseconds)
//! 7. anything else -> last-resort construction from its text form
//!
//! Any path that does not land on a representable point in time is a
//! cast error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use super::calendar;
use super::candidate::{Candidate, Primitive};
use super::clock::{Clock, SystemClock};
use super::duration;
use super::errors::{FieldError, FieldResult, ValidationError};
use super::field_type::SchemaType;
use super::messages::{self, MessageTemplate, Placeholder};
use super::options::DateFieldOptions;
use super::query::{self, ConditionalHandler, QueryOperand, QueryOperator};
use super::validators::{predicate, Bound, Predicate, ValidatorChain, ValidatorEntry, ValidatorHandle, ValidatorKind};
use crate::observability::{log_event, Event};

/// Kind tag carried by date cast errors
pub const DATE_KIND: &str = "date";

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Casts `value` to a date for the field at `path`.
pub fn cast_date(path: &str, value: &Candidate) -> FieldResult<Option<DateTime<Utc>>> {
    if value.is_nullish() {
        return Ok(None);
    }

    let constructed = match value {
        Candidate::Null | Candidate::Undefined => return Ok(None),
        Candidate::Date(dt) => return Ok(Some(*dt)),
        Candidate::Bool(_) => None,
        Candidate::Number(n) => calendar::from_epoch_millis(*n),
        Candidate::Text(text) => match calendar::numeric_value(text) {
            Some(n) if calendar::outside_year_range(n) => calendar::from_epoch_millis(n),
            _ => from_primitive(Primitive::Text(text.clone())),
        },
        Candidate::Coercible(inner) => from_primitive(inner.to_primitive()),
        Candidate::List(_) => calendar::parse(&value.to_string()),
        Candidate::Object(_) => None,
    };

    constructed
        .map(Some)
        .ok_or_else(|| FieldError::cast(DATE_KIND, value, path))
}

fn from_primitive(primitive: Primitive) -> Option<DateTime<Utc>> {
    match primitive {
        Primitive::Millis(millis) => calendar::from_epoch_millis(millis),
        Primitive::Text(text) => calendar::parse(&text),
    }
}

/// Index expiry, either seconds or a duration string (`"24h"`, `"7d"`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expiry {
    Seconds(f64),
    Text(String),
}

impl Expiry {
    /// Whole seconds, rounded.
    pub fn to_seconds(&self) -> FieldResult<i64> {
        let seconds = match self {
            Expiry::Seconds(s) => duration::whole_seconds(*s)?,
            Expiry::Text(text) => duration::parse_seconds(text)?,
        };
        if seconds < 0 {
            return Err(FieldError::config(format!("expiry must not be negative, got {}", seconds)));
        }
        Ok(seconds)
    }
}

impl From<f64> for Expiry {
    fn from(seconds: f64) -> Self {
        Expiry::Seconds(seconds)
    }
}

impl From<i64> for Expiry {
    fn from(seconds: i64) -> Self {
        Expiry::Seconds(seconds as f64)
    }
}

impl From<i32> for Expiry {
    fn from(seconds: i32) -> Self {
        Expiry::Seconds(f64::from(seconds))
    }
}

impl From<&str> for Expiry {
    fn from(text: &str) -> Self {
        Expiry::Text(text.to_string())
    }
}

impl From<String> for Expiry {
    fn from(text: String) -> Self {
        Expiry::Text(text)
    }
}

/// Index options declared on a field. Interpreted by the index builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexSpec {
    options: BTreeMap<String, Value>,
}

impl IndexSpec {
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.options.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Expiry in whole seconds, if declared
    pub fn expires(&self) -> Option<i64> {
        self.options.get("expires").and_then(Value::as_i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundSide {
    Min,
    Max,
}

impl BoundSide {
    fn kind(self) -> ValidatorKind {
        match self {
            BoundSide::Min => ValidatorKind::Min,
            BoundSide::Max => ValidatorKind::Max,
        }
    }

    fn placeholder(self) -> Placeholder {
        match self {
            BoundSide::Min => Placeholder::Min,
            BoundSide::Max => Placeholder::Max,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            BoundSide::Min => messages::DATE_MIN,
            BoundSide::Max => messages::DATE_MAX,
        }
    }

    fn satisfied(self, candidate: i64, bound: i64) -> bool {
        match self {
            BoundSide::Min => candidate >= bound,
            BoundSide::Max => candidate <= bound,
        }
    }
}

/// Builds the predicate of a min / max validator.
///
/// The bound is resolved on every call: `Now` reads the clock, literals
/// and computed bounds are cast again.
fn bound_predicate(path: String, bound: Bound, side: BoundSide, clock: Arc<dyn Clock>) -> Predicate<DateTime<Utc>> {
    predicate(move |value: Option<&DateTime<Utc>>| {
        let Some(value) = value else {
            return Ok(true);
        };
        let resolved = match &bound {
            Bound::Now => Some(clock.now()),
            Bound::Literal(literal) => cast_date(&path, literal)?,
            Bound::Computed(compute) => cast_date(&path, &compute())?,
        };
        match resolved {
            Some(limit) => Ok(side.satisfied(value.timestamp_millis(), limit.timestamp_millis())),
            None => Ok(true),
        }
    })
}

/// Field type for date attributes.
#[derive(Clone)]
pub struct DateField {
    path: String,
    validators: ValidatorChain<DateTime<Utc>>,
    min_slot: Option<ValidatorHandle>,
    max_slot: Option<ValidatorHandle>,
    required_slot: Option<ValidatorHandle>,
    index_spec: Option<IndexSpec>,
    conditional_handlers: BTreeMap<QueryOperator, ConditionalHandler<DateField>>,
    clock: Arc<dyn Clock>,
}

impl DateField {
    /// Creates a date field at `path` reading "now" from the wall clock.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Creates a date field whose deferred bounds read `clock`.
    pub fn with_clock(path: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let mut conditional_handlers = query::base_handlers::<DateField>();
        for op in [QueryOperator::Gt, QueryOperator::Gte, QueryOperator::Lt, QueryOperator::Lte] {
            conditional_handlers.insert(op, query::cast_single::<DateField>);
        }

        let field = Self {
            path: path.into(),
            validators: ValidatorChain::new(),
            min_slot: None,
            max_slot: None,
            required_slot: None,
            index_spec: None,
            conditional_handlers,
            clock,
        };
        log_event(Event::FieldDeclared, &[("kind", DATE_KIND), ("path", field.path.as_str())]);
        field
    }

    /// Creates a date field and applies `options`.
    pub fn from_options(path: impl Into<String>, options: &DateFieldOptions) -> FieldResult<Self> {
        Self::from_options_with_clock(path, options, Arc::new(SystemClock))
    }

    pub fn from_options_with_clock(
        path: impl Into<String>,
        options: &DateFieldOptions,
        clock: Arc<dyn Clock>,
    ) -> FieldResult<Self> {
        let mut field = Self::with_clock(path, clock);
        options.apply(&mut field)?;
        Ok(field)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &'static str {
        DATE_KIND
    }

    /// Casts a raw value to a date. See the module docs for precedence.
    pub fn cast(&self, value: &Candidate) -> FieldResult<Option<DateTime<Utc>>> {
        cast_date(&self.path, value).map_err(|err| {
            log_event(
                Event::CastRejected,
                &[("kind", DATE_KIND), ("path", self.path.as_str()), ("type", value.type_name())],
            );
            err
        })
    }

    /// True iff `value` is a genuine date, not merely castable to one.
    pub fn check_required(&self, value: &Candidate) -> bool {
        matches!(value, Candidate::Date(_))
    }

    /// Casts a query operand, see `SchemaType::cast_for_query`.
    pub fn cast_for_query(
        &self,
        operator: Option<&str>,
        value: &Candidate,
    ) -> FieldResult<QueryOperand<DateTime<Utc>>> {
        SchemaType::cast_for_query(self, operator, value)
    }

    /// Makes the field required (or optional again).
    pub fn required(&mut self, required: bool) -> &mut Self {
        self.set_required(required, None)
    }

    pub fn required_with_message(&mut self, message: impl Into<MessageTemplate>) -> &mut Self {
        self.set_required(true, Some(message.into()))
    }

    fn set_required(&mut self, required: bool, message: Option<MessageTemplate>) -> &mut Self {
        if let Some(handle) = self.required_slot.take() {
            self.validators.remove(handle);
        }
        if required {
            let message = message.unwrap_or_else(|| MessageTemplate::new(messages::REQUIRED));
            let handle = self.validators.push(
                ValidatorKind::Required,
                message,
                None,
                predicate(|value: Option<&DateTime<Utc>>| Ok(value.is_some())),
            );
            self.required_slot = Some(handle);
        }
        self
    }

    /// Installs (or replaces) the minimum bound. `None` or a falsy literal
    /// removes it.
    pub fn min(&mut self, bound: impl Into<Option<Bound>>) -> &mut Self {
        self.set_bound(BoundSide::Min, bound.into(), None)
    }

    pub fn min_with_message(&mut self, bound: impl Into<Option<Bound>>, message: impl Into<MessageTemplate>) -> &mut Self {
        self.set_bound(BoundSide::Min, bound.into(), Some(message.into()))
    }

    /// Installs (or replaces) the maximum bound. `None` or a falsy literal
    /// removes it.
    pub fn max(&mut self, bound: impl Into<Option<Bound>>) -> &mut Self {
        self.set_bound(BoundSide::Max, bound.into(), None)
    }

    pub fn max_with_message(&mut self, bound: impl Into<Option<Bound>>, message: impl Into<MessageTemplate>) -> &mut Self {
        self.set_bound(BoundSide::Max, bound.into(), Some(message.into()))
    }

    fn set_bound(&mut self, side: BoundSide, bound: Option<Bound>, message: Option<MessageTemplate>) -> &mut Self {
        let slot = match side {
            BoundSide::Min => self.min_slot.take(),
            BoundSide::Max => self.max_slot.take(),
        };
        if let Some(handle) = slot {
            self.validators.remove(handle);
            log_event(
                Event::BoundRemoved,
                &[("kind", side.kind().as_str()), ("path", self.path.as_str())],
            );
        }

        let bound = match bound {
            Some(bound) if !bound.is_unset() => bound,
            _ => return self,
        };

        let rendered = self.render_bound(&bound);
        let message = message
            .unwrap_or_else(|| MessageTemplate::new(side.default_message()))
            .fill(side.placeholder(), &rendered);
        let check = bound_predicate(self.path.clone(), bound.clone(), side, Arc::clone(&self.clock));
        let handle = self.validators.push(side.kind(), message, Some(bound), check);

        match side {
            BoundSide::Min => self.min_slot = Some(handle),
            BoundSide::Max => self.max_slot = Some(handle),
        }
        log_event(
            Event::BoundInstalled,
            &[
                ("bound", rendered.as_str()),
                ("kind", side.kind().as_str()),
                ("path", self.path.as_str()),
            ],
        );
        self
    }

    fn render_bound(&self, bound: &Bound) -> String {
        match bound {
            Bound::Now => messages::NOW_MARKER.to_string(),
            Bound::Computed(_) => messages::COMPUTED_MARKER.to_string(),
            Bound::Literal(literal) => match cast_date(&self.path, literal) {
                Ok(Some(dt)) => format_date(&dt),
                _ => literal.to_string(),
            },
        }
    }

    /// Active minimum validator, if any
    pub fn min_validator(&self) -> Option<&ValidatorEntry<DateTime<Utc>>> {
        self.min_slot.and_then(|handle| self.validators.get(handle))
    }

    /// Active maximum validator, if any
    pub fn max_validator(&self) -> Option<&ValidatorEntry<DateTime<Utc>>> {
        self.max_slot.and_then(|handle| self.validators.get(handle))
    }

    /// Appends a custom validator. Returns its handle for later removal.
    pub fn add_validator<F>(&mut self, name: impl Into<String>, message: impl Into<MessageTemplate>, check: F) -> ValidatorHandle
    where
        F: Fn(Option<&DateTime<Utc>>) -> FieldResult<bool> + Send + Sync + 'static,
    {
        self.validators.push(
            ValidatorKind::Custom(name.into()),
            message.into(),
            None,
            predicate(check),
        )
    }

    /// Removes a validator by handle, clearing a bound slot that pointed at it.
    pub fn remove_validator(&mut self, handle: ValidatorHandle) -> bool {
        for slot in [&mut self.min_slot, &mut self.max_slot, &mut self.required_slot] {
            if *slot == Some(handle) {
                *slot = None;
            }
        }
        self.validators.remove(handle).is_some()
    }

    pub fn validators(&self) -> &ValidatorChain<DateTime<Utc>> {
        &self.validators
    }

    /// Casts `value` then runs the validator chain.
    pub fn validate(&self, value: &Candidate) -> Result<Option<DateTime<Utc>>, ValidationError> {
        let cast = self
            .cast(value)
            .map_err(|err| ValidationError::from_field_error(self.path.as_str(), value.to_string(), &err))?;
        self.do_validate(cast.as_ref())?;
        Ok(cast)
    }

    /// Runs the validator chain in order; the first failing entry wins.
    pub fn do_validate(&self, value: Option<&DateTime<Utc>>) -> Result<(), ValidationError> {
        let shown = value.map_or_else(|| "null".to_string(), format_date);

        for entry in self.validators.iter() {
            let passed = entry
                .check(value)
                .map_err(|err| ValidationError::from_field_error(self.path.as_str(), shown.as_str(), &err))?;
            if passed {
                continue;
            }

            log_event(
                Event::ValidationFailed,
                &[
                    ("path", self.path.as_str()),
                    ("validator", entry.kind().as_str()),
                    ("value", shown.as_str()),
                ],
            );
            let message = entry.message().render(&[
                (Placeholder::Path, self.path.as_str()),
                (Placeholder::Value, shown.as_str()),
                (Placeholder::Kind, DATE_KIND),
            ]);
            return Err(ValidationError::new(
                self.path.as_str(),
                entry.kind().as_str(),
                shown,
                message,
            ));
        }

        Ok(())
    }

    /// Declares the field indexed (or not).
    pub fn index(&mut self, on: bool) -> &mut Self {
        self.index_spec_mut().set("index", Value::Bool(on));
        self
    }

    pub fn unique(&mut self, on: bool) -> &mut Self {
        self.index_spec_mut().set("unique", Value::Bool(on));
        self
    }

    pub fn sparse(&mut self, on: bool) -> &mut Self {
        self.index_spec_mut().set("sparse", Value::Bool(on));
        self
    }

    /// Declares a TTL on the field's index, in seconds or as a duration
    /// string.
    pub fn expires(&mut self, when: impl Into<Expiry>) -> FieldResult<&mut Self> {
        let seconds = when.into().to_seconds()?;
        self.index_spec_mut().set("expires", Value::from(seconds));
        log_event(
            Event::ExpiresSet,
            &[("path", self.path.as_str()), ("seconds", seconds.to_string().as_str())],
        );
        Ok(self)
    }

    pub fn index_spec(&self) -> Option<&IndexSpec> {
        self.index_spec.as_ref()
    }

    fn index_spec_mut(&mut self) -> &mut IndexSpec {
        self.index_spec.get_or_insert_with(IndexSpec::default)
    }
}

impl SchemaType for DateField {
    type Value = DateTime<Utc>;

    fn kind(&self) -> &'static str {
        DATE_KIND
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn cast(&self, value: &Candidate) -> FieldResult<Option<DateTime<Utc>>> {
        DateField::cast(self, value)
    }

    fn check_required(&self, value: &Candidate) -> bool {
        DateField::check_required(self, value)
    }

    fn validators(&self) -> &ValidatorChain<DateTime<Utc>> {
        &self.validators
    }

    fn conditional_handlers(&self) -> &BTreeMap<QueryOperator, ConditionalHandler<Self>> {
        &self.conditional_handlers
    }
}

impl fmt::Debug for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateField")
            .field("path", &self.path)
            .field("validators", &self.validators)
            .field("min_slot", &self.min_slot)
            .field("max_slot", &self.max_slot)
            .field("index_spec", &self.index_spec)
            .field("operators", &self.conditional_handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
