//! CLI argument definitions using clap
//!
//! Commands:
//! - modelgate schemas
//! - modelgate export <name>
//! - modelgate bind <name> --body <file> --query k=v --header k=v --path k=v
//! - modelgate shape <name> --input <file> --include <path> --exclude <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// modelgate - declarative request binding and response shaping
#[derive(Parser, Debug)]
#[command(name = "modelgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./modelgate.json if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered schemas
    Schemas,

    /// Print the JSON Schema of a registered schema
    Export {
        /// Schema name
        name: String,
    },

    /// Bind request inputs against a schema and print the bound value
    Bind {
        /// Schema name
        name: String,

        /// JSON file holding the request body
        #[arg(long)]
        body: Option<PathBuf>,

        /// Query parameter, repeatable
        #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// Header, repeatable
        #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        header: Vec<(String, String)>,

        /// Path parameter, repeatable
        #[arg(long = "path", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        path: Vec<(String, String)>,
    },

    /// Validate a JSON value against a response schema and print it shaped
    Shape {
        /// Response schema name
        name: String,

        /// JSON file holding the response value (object or array)
        #[arg(long)]
        input: PathBuf,

        /// Dot-path to keep, repeatable
        #[arg(long)]
        include: Vec<String>,

        /// Dot-path to drop, repeatable
        #[arg(long)]
        exclude: Vec<String>,

        /// Omit fields not present in the input
        #[arg(long)]
        exclude_unset: bool,

        /// Omit null fields
        #[arg(long)]
        exclude_none: bool,

        /// Omit fields equal to their default
        #[arg(long)]
        exclude_defaults: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}
