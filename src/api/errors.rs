//! HTTP error surface
//!
//! Maps binding, shaping and registry failures onto status codes and JSON
//! bodies. Client-facing bodies always carry a `detail` member: a list of
//! `{loc, msg, type}` entries for validation failures, a string otherwise.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::binding::{BindError, ValidationError};
use crate::schema::SchemaError;
use crate::shaping::ShapeError;

/// Result type for request handling
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request inputs failed their schema
    #[error(transparent)]
    Validation(ValidationError),

    /// Body was not valid JSON
    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    /// Handler-level "not found"
    #[error("Not found: {0}")]
    NotFound(String),

    /// Handler raised an explicit status with a detail message
    #[error("HTTP {status}: {detail}")]
    Http {
        status: StatusCode,
        detail: String,
        headers: Vec<(String, String)>,
    },

    // ==================
    // Server Errors (5xx, or 404 for unknown schemas)
    // ==================
    #[error(transparent)]
    Schema(SchemaError),

    #[error(transparent)]
    Shape(ShapeError),
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
            headers: Vec::new(),
        }
    }

    /// Adds a response header to an `Http` error; other variants are unchanged.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let ApiError::Http { headers, .. } = &mut self {
            headers.push((name.into(), value.into()));
        }
        self
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "MG_VALIDATION_FAILED",
            ApiError::MalformedBody(_) => "MG_MALFORMED_BODY",
            ApiError::NotFound(_) => "MG_NOT_FOUND",
            ApiError::Http { .. } => "MG_HTTP_EXCEPTION",
            ApiError::Schema(e) => e.code(),
            ApiError::Shape(e) => e.code(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 422 Unprocessable Entity
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 404 Not Found
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Schema(e) if e.is_not_found() => StatusCode::NOT_FOUND,

            ApiError::Http { status, .. } => *status,

            // 500 Internal Server Error
            ApiError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Shape(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(batch) => json!({ "detail": batch.to_detail() }),
            ApiError::MalformedBody(reason) => json!({
                "detail": [{
                    "loc": ["body"],
                    "msg": reason,
                    "type": "value_error.jsondecode",
                }]
            }),
            ApiError::NotFound(detail) | ApiError::Http { detail, .. } => json!({ "detail": detail }),
            ApiError::Schema(e) if e.is_not_found() => json!({ "detail": e.to_string() }),
            ApiError::Schema(_) | ApiError::Shape(_) => json!({ "detail": "Internal Server Error" }),
        }
    }
}

impl From<BindError> for ApiError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::Validation(e) => ApiError::Validation(e),
            BindError::Schema(e) => ApiError::Schema(e),
        }
    }
}

impl From<ShapeError> for ApiError {
    fn from(err: ShapeError) -> Self {
        match err {
            ShapeError::Schema(e) => ApiError::Schema(e),
            other => ApiError::Shape(other),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::Schema(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        }

        let mut response = (status, Json(self.body())).into_response();
        if let ApiError::Http { headers, .. } = &self {
            for (name, value) in headers {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::try_from(name.as_str()),
                    HeaderValue::from_str(value),
                ) {
                    response.headers_mut().append(name, value);
                }
            }
        }
        response
    }
}
