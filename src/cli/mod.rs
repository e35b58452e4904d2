//! CLI module for aerodate
//!
//! Provides command-line interface for:
//! - cast: Cast a value to the field's canonical form
//! - validate: Cast a value and run the field's validators
//! - query: Cast a query operand under an operator

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, FieldArgs};
pub use commands::{cast, query, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_value, write_error, write_response};
