//! aerodate - strict date field type for aerodb schemas
//!
//! Casting, bound validation and query operand casting for date
//! attributes.
//!
//! ```ignore
//! use aerodate::schema::{Bound, Candidate, DateField};
//!
//! let mut field = DateField::new("starts_at");
//! field.min(Bound::literal("2020-01-01")).max(Bound::Now);
//! let value = field.validate(&Candidate::from("2024-05-01"))?;
//! ```

pub mod cli;
pub mod observability;
pub mod schema;
