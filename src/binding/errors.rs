//! Binding error types
//!
//! Error codes:
//! - MG_MISSING
//! - MG_TYPE_MISMATCH
//! - MG_CONSTRAINT_VIOLATION
//! - MG_EXTRA_FIELD
//!
//! A bind call reports every field-level failure in one [`ValidationError`]
//! batch instead of stopping at the first.

use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

use crate::schema::{ParamSource, SchemaError};

/// Result type for binding operations
pub type BindResult<T> = Result<T, BindError>;

/// Classification of a single field failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required field absent from input
    Missing,
    /// Value could not be coerced to the declared type
    TypeMismatch { expected: String },
    /// Coerced value failed a constraint
    ConstraintViolation { constraint: String, value: String },
    /// Undeclared key under a schema that forbids extras
    ExtraField,
}

impl ErrorKind {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "MG_MISSING",
            ErrorKind::TypeMismatch { .. } => "MG_TYPE_MISMATCH",
            ErrorKind::ConstraintViolation { .. } => "MG_CONSTRAINT_VIOLATION",
            ErrorKind::ExtraField => "MG_EXTRA_FIELD",
        }
    }

    /// Short machine-readable type tag for client responses.
    pub fn error_type(&self) -> String {
        match self {
            ErrorKind::Missing => "missing".into(),
            ErrorKind::TypeMismatch { .. } => "type_error".into(),
            ErrorKind::ConstraintViolation { constraint, .. } => format!("value_error.{}", constraint),
            ErrorKind::ExtraField => "extra_forbidden".into(),
        }
    }
}

/// One failing field, identified by source and path (e.g. `items[1].name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub location: ParamSource,
    pub path: String,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn missing(location: ParamSource, path: impl Into<String>) -> Self {
        Self {
            location,
            path: path.into(),
            kind: ErrorKind::Missing,
        }
    }

    pub fn type_mismatch(location: ParamSource, path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            location,
            path: path.into(),
            kind: ErrorKind::TypeMismatch {
                expected: expected.into(),
            },
        }
    }

    pub fn constraint(
        location: ParamSource,
        path: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            location,
            path: path.into(),
            kind: ErrorKind::ConstraintViolation {
                constraint: constraint.into(),
                value: value.into(),
            },
        }
    }

    pub fn extra(location: ParamSource, path: impl Into<String>) -> Self {
        Self {
            location,
            path: path.into(),
            kind: ErrorKind::ExtraField,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Missing => "field required".into(),
            ErrorKind::TypeMismatch { expected } => format!("value is not a valid {}", expected),
            ErrorKind::ConstraintViolation { constraint, value } => {
                format!("value '{}' violates constraint {}", value, constraint)
            }
            ErrorKind::ExtraField => "extra fields not permitted".into(),
        }
    }

    /// Client-facing detail entry: `{loc, msg, type}`.
    pub fn to_detail(&self) -> Value {
        let mut loc = vec![Value::String(self.location.as_str().into())];
        if !self.path.is_empty() {
            loc.push(Value::String(self.path.clone()));
        }
        json!({
            "loc": loc,
            "msg": self.message(),
            "type": self.kind.error_type(),
        })
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.location, self.path, self.message())
    }
}

/// Batch of field failures from one bind call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    schema: String,
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s) for {}", self.errors.len(), self.schema)?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(schema: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            schema: schema.into(),
            errors,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors whose path equals `path` or lies beneath it.
    pub fn at_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| {
            e.path == path
                || e.path
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }

    pub fn to_detail(&self) -> Value {
        Value::Array(self.errors.iter().map(FieldError::to_detail).collect())
    }
}

/// Failure of a bind call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The input did not satisfy the schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema could not be resolved
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl BindError {
    pub fn code(&self) -> &'static str {
        match self {
            BindError::Validation(_) => "MG_VALIDATION_FAILED",
            BindError::Schema(e) => e.code(),
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            BindError::Validation(e) => Some(e),
            BindError::Schema(_) => None,
        }
    }
}
