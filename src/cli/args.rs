//! CLI argument definitions using clap
//!
//! Commands:
//! - aerodate cast <VALUE> [--options <path>]
//! - aerodate validate <VALUE> [--options <path>]
//! - aerodate query <VALUE> [--operator <op>] [--options <path>]
//!
//! `VALUE` is read as JSON when it parses, otherwise as a plain string.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// aerodate - cast and validate date field values
#[derive(Parser, Debug)]
#[command(name = "aerodate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum log severity (trace, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Field declaration shared by all commands
#[derive(Args, Debug, Clone)]
pub struct FieldArgs {
    /// Field path used in messages
    #[arg(long, default_value = "value")]
    pub path: String,

    /// Declared field kind
    #[arg(long, default_value = "date")]
    pub kind: String,

    /// Path to a JSON file with field options
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cast a value and print the canonical form
    Cast {
        #[command(flatten)]
        field: FieldArgs,

        /// Value to cast
        value: String,
    },

    /// Cast a value and run the field's validators
    Validate {
        #[command(flatten)]
        field: FieldArgs,

        /// Value to validate
        value: String,
    },

    /// Cast a query operand
    Query {
        #[command(flatten)]
        field: FieldArgs,

        /// Operator token ($gt, less-than, $in, ...); omit for plain equality
        #[arg(long)]
        operator: Option<String>,

        /// Operand to cast
        value: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "aerodate",
            "query",
            "--operator",
            "$gt",
            "--path",
            "starts_at",
            "2020-01-01",
        ])
        .unwrap();
        match cli.command {
            Command::Query { field, operator, value } => {
                assert_eq!(field.path, "starts_at");
                assert_eq!(field.kind, "date");
                assert_eq!(operator.as_deref(), Some("$gt"));
                assert_eq!(value, "2020-01-01");
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_parse_validate_with_options() {
        let cli = Cli::try_parse_from([
            "aerodate",
            "--log-level",
            "trace",
            "validate",
            "--options",
            "field.json",
            "null",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "trace");
        assert!(matches!(
            cli.command,
            Command::Validate { ref field, .. } if field.options.as_deref() == Some(std::path::Path::new("field.json"))
        ));
    }
}
