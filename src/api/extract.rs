//! Request input extraction
//!
//! Collects the pieces of an HTTP request that binding consumes. Path
//! parameters come from whatever router matched the request.

use std::collections::HashMap;

use axum::http::{HeaderMap, Uri};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::binding::RawInputs;

/// Builds [`RawInputs`] from request parts. An empty body means "no body".
pub fn raw_inputs(
    path_params: &HashMap<String, String>,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<RawInputs> {
    let mut inputs = RawInputs::new().with_headers(headers);

    for (name, value) in path_params {
        inputs = inputs.with_path(name.as_str(), value.as_str());
    }
    if let Some(query) = uri.query() {
        inputs = inputs.with_query_string(query);
    }
    if !body.iter().all(u8::is_ascii_whitespace) {
        let parsed: Value = serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
        inputs = inputs.with_body(parsed);
    }

    Ok(inputs)
}
