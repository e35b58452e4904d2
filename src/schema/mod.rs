//! Schema field types for aerodate
//!
//! A field type governs one document attribute: how raw input is cast to
//! the canonical value, which validators run on the cast value, and how the
//! attribute is cast when it appears as a query operand.
//!
//! # Design Principles
//!
//! - Casting either yields a valid value, no value, or an error
//! - Validators run in insertion order; the first failure is reported
//! - Min / max bounds are replaced in place, never stacked
//! - Bounds tolerate empty values; presence belongs to `required`
//! - Query operators without a handler for the kind are usage errors

mod calendar;
mod candidate;
mod clock;
mod date;
mod duration;
mod errors;
mod field_type;
mod messages;
mod options;
mod query;
mod validators;

pub use calendar::{max_year, min_year};
pub use candidate::{Candidate, Primitive, TimeCoercion};
pub use clock::{Clock, ManualClock, SystemClock};
pub use date::{cast_date, format_date, DateField, Expiry, IndexSpec, DATE_KIND};
pub use duration::{parse_millis as parse_duration_millis, parse_seconds as parse_duration_seconds};
pub use errors::{FieldError, FieldErrorCode, FieldResult, Severity, ValidationError};
pub use field_type::{SchemaField, SchemaType};
pub use messages::{MessageTemplate, Placeholder};
pub use options::{BoundOption, DateFieldOptions, ExpiresOption, RequiredOption};
pub use query::{QueryOperand, QueryOperator};
pub use validators::{Bound, ValidatorChain, ValidatorEntry, ValidatorHandle, ValidatorKind};
