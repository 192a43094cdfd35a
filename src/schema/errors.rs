//! Schema error types
//!
//! Error codes:
//! - MG_DUPLICATE_SCHEMA
//! - MG_SCHEMA_NOT_FOUND
//! - MG_INVALID_SCHEMA
//! - MG_MALFORMED_SCHEMA_FILE
//!
//! Registry errors are single-cause and reported immediately.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while defining, loading or resolving schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema with this name is already registered
    #[error("Schema '{name}' is already defined")]
    DuplicateSchema { name: String },

    /// No schema registered under this name
    #[error("Schema '{name}' not found")]
    SchemaNotFound { name: String },

    /// Schema definition is structurally invalid
    #[error("Invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// Schema file could not be read or parsed
    #[error("Malformed schema file '{path}': {reason}")]
    MalformedSchemaFile { path: String, reason: String },
}

impl SchemaError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateSchema { name: name.into() }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    pub fn invalid_schema(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: "<pattern>".into(),
            reason: format!("pattern '{}' does not compile: {}", pattern, reason.into()),
        }
    }

    pub fn malformed_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchemaFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateSchema { .. } => "MG_DUPLICATE_SCHEMA",
            SchemaError::SchemaNotFound { .. } => "MG_SCHEMA_NOT_FOUND",
            SchemaError::InvalidSchema { .. } => "MG_INVALID_SCHEMA",
            SchemaError::MalformedSchemaFile { .. } => "MG_MALFORMED_SCHEMA_FILE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::SchemaNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::duplicate("Item").code(), "MG_DUPLICATE_SCHEMA");
        assert_eq!(SchemaError::not_found("Item").code(), "MG_SCHEMA_NOT_FOUND");
        assert_eq!(SchemaError::invalid_schema("Item", "x").code(), "MG_INVALID_SCHEMA");
        assert_eq!(SchemaError::malformed_file("a.json", "x").code(), "MG_MALFORMED_SCHEMA_FILE");
    }

    #[test]
    fn test_display_names_schema() {
        let err = SchemaError::not_found("Offer");
        assert_eq!(err.to_string(), "Schema 'Offer' not found");
        assert!(err.is_not_found());
    }
}
