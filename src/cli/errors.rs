//! CLI-specific error types
//!
//! Error codes:
//! - MG_CLI_CONFIG_ERROR
//! - MG_CLI_IO_ERROR
//! - MG_CLI_INVALID_ARGUMENT
//!
//! Library failures keep their own codes.

use std::io;

use serde_json::Value;
use thiserror::Error;

use crate::binding::BindError;
use crate::schema::SchemaError;
use crate::shaping::ShapeError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (files, stdout)
    #[error("I/O error: {0}")]
    Io(String),

    /// Input file content is not usable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "MG_CLI_CONFIG_ERROR",
            CliError::Io(_) => "MG_CLI_IO_ERROR",
            CliError::InvalidArgument(_) => "MG_CLI_INVALID_ARGUMENT",
            CliError::Schema(e) => e.code(),
            CliError::Bind(e) => e.code(),
            CliError::Shape(e) => e.code(),
        }
    }

    /// Per-field failures, when the error carries a validation batch.
    pub fn detail(&self) -> Option<Value> {
        match self {
            CliError::Bind(e) => e.as_validation().map(|batch| batch.to_detail()),
            CliError::Shape(ShapeError::ResponseValidation(batch)) => Some(batch.to_detail()),
            _ => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}
