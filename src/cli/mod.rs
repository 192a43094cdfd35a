//! CLI module for modelgate
//!
//! Provides command-line access to the registry for offline checks:
//! - schemas: list registered schemas
//! - export: JSON Schema of one schema
//! - bind: bind request inputs given as files and key=value pairs
//! - shape: validate and shape a response document

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{bind, build_registry, export, run, run_command, schemas, shape};
pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
pub use errors::{CliError, CliResult};
pub use io::{error_report, read_json_file, write_error, write_json};
