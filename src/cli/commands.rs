//! CLI command implementations
//!
//! Every command declares one field from `--kind`, `--path` and the
//! optional options file, runs a single operation on the value and prints
//! one JSON response line.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::{Logger, Severity};
use crate::schema::{format_date, Candidate, SchemaField};

use super::args::{Cli, Command, FieldArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_value, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let severity = Severity::parse(&cli.log_level)
        .ok_or_else(|| CliError::invalid_input(format!("unknown log level '{}'", cli.log_level)))?;
    Logger::set_min_severity(severity);
    run_command(cli.command)
}

/// Run the command and print its response line
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Cast { field, value } => cast(&field, &value),
        Command::Validate { field, value } => validate(&field, &value),
        Command::Query { field, operator, value } => query(&field, operator.as_deref(), &value),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Casts `value` to the field's canonical form
pub fn cast(args: &FieldArgs, value: &str) -> CliResult<Value> {
    let field = build_field(args)?;
    let candidate = Candidate::from_json(&read_value(value));
    let cast = field.cast_to_json(&candidate)?;
    Ok(json!({ "path": field.path(), "value": cast }))
}

/// Casts `value` and runs the field's validator chain on it
pub fn validate(args: &FieldArgs, value: &str) -> CliResult<Value> {
    let field = build_field(args)?;
    let candidate = Candidate::from_json(&read_value(value));
    let validated = match &field {
        SchemaField::Date(date) => date.validate(&candidate)?.map_or(Value::Null, |dt| json!(format_date(&dt))),
    };
    Ok(json!({ "path": field.path(), "valid": true, "value": validated }))
}

/// Casts `value` as a query operand, optionally under `operator`
pub fn query(args: &FieldArgs, operator: Option<&str>, value: &str) -> CliResult<Value> {
    let field = build_field(args)?;
    let candidate = Candidate::from_json(&read_value(value));
    let operand = field.cast_for_query_to_json(operator, &candidate)?;
    Ok(json!({
        "path": field.path(),
        "operator": operator,
        "operand": operand
    }))
}

fn build_field(args: &FieldArgs) -> CliResult<SchemaField> {
    let options = match &args.options {
        Some(path) => load_options(path)?,
        None => json!({}),
    };
    Ok(SchemaField::from_options(&args.kind, &args.path, &options)?)
}

/// Load field options from a JSON file
fn load_options(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::config_error(format!("Failed to read options: {}", e)))?;

    let options: Value = serde_json::from_str(&content)
        .map_err(|e| CliError::config_error(format!("Invalid options JSON: {}", e)))?;

    if !options.is_object() {
        return Err(CliError::config_error("Field options must be a JSON object"));
    }

    Ok(options)
}
