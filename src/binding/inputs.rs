//! Raw request inputs
//!
//! Untyped values grouped by where they came from. Query parameters and
//! headers may repeat; header names are matched case-insensitively.

use std::collections::HashMap;

use axum::http::HeaderMap;
use serde_json::Value;

/// Untyped inbound data for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInputs {
    path: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs consisting of a JSON body only.
    pub fn body_only(body: Value) -> Self {
        Self::new().with_body(body)
    }

    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends every pair of a URL query string (`a=1&a=2&b=x%20y`).
    pub fn with_query_string(mut self, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.query
            .extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.as_ref().to_ascii_lowercase(), value.into()));
        self
    }

    /// Appends every header whose value is valid visible ASCII.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            if let Ok(text) = value.to_str() {
                self.headers.push((name.as_str().to_string(), text.to_string()));
            }
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str)
    }

    /// All values of a query key, in order of appearance.
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All values of a header, in order of appearance.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
