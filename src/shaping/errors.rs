//! Shaping error types
//!
//! Error codes:
//! - MG_SHAPE_CONFIG
//! - MG_RESPONSE_VALIDATION
//!
//! Configuration errors are caller mistakes in the directive. A response
//! that fails its own schema is a server-side fault.

use thiserror::Error;

use crate::binding::{BindError, ValidationError};
use crate::schema::SchemaError;

/// Result type for shaping operations
pub type ShapeResult<T> = Result<T, ShapeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// `include` and `exclude` were both given
    #[error("include and exclude cannot be combined in one directive")]
    IncludeExcludeConflict,

    /// A dot-path is empty, has an empty segment or names no declared field
    #[error("Invalid shape path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Response schema (or a nested one) could not be resolved
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The value produced for a response does not satisfy its schema
    #[error("Response validation failed: {0}")]
    ResponseValidation(ValidationError),
}

impl ShapeError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ShapeError::IncludeExcludeConflict | ShapeError::InvalidPath { .. } => "MG_SHAPE_CONFIG",
            ShapeError::Schema(e) => e.code(),
            ShapeError::ResponseValidation(_) => "MG_RESPONSE_VALIDATION",
        }
    }

    /// Whether the directive itself is at fault.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ShapeError::IncludeExcludeConflict | ShapeError::InvalidPath { .. }
        )
    }
}

impl From<BindError> for ShapeError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::Validation(e) => ShapeError::ResponseValidation(e),
            BindError::Schema(e) => ShapeError::Schema(e),
        }
    }
}
