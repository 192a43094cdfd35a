//! Demo catalog handlers
//!
//! Plain functions over bound parameters. What a framework would inject
//! through dependencies (`common_parameters`, the query checker) is passed
//! in as explicit values instead.

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{ApiError, ApiResult};
use crate::binding::{BoundObject, BoundValue};

/// Backing data for the skip/limit listing.
pub const FAKE_ITEMS_DB: [&str; 3] = ["Foo", "Bar", "Baz"];

pub fn root() -> Value {
    json!({"message": "Hello World"})
}

/// `item_id` and `q` echoed back; the long description unless `short`.
pub fn read_item(params: &BoundObject) -> Value {
    let mut out = json!({ "item_id": params.get_i64("item_id") });
    if let Some(q) = params.get_str("q").filter(|q| !q.is_empty()) {
        out["q"] = json!(q);
    }
    if !params.get_bool("short").unwrap_or(false) {
        out["description"] = json!("This is an amazing item that has a long description");
    }
    out
}

/// Canned search results, with the query echoed back when present.
pub fn search_items(params: &BoundObject) -> Value {
    let mut out = json!({"items": [{"item_id": "Foo"}, {"item_id": "Bar"}]});
    if let Some(q) = params.get_str("q").filter(|q| !q.is_empty()) {
        out["q"] = json!(q);
    }
    out
}

pub fn get_model(params: &BoundObject) -> Value {
    let model = params.get_str("model_name").unwrap_or_default();
    let message = match model {
        "alexnet" => "Deep Learning FTW!",
        "lenet" => "LeCNN all the images",
        _ => "Have some residuals",
    };
    json!({"model_name": model, "message": message})
}

/// Slice of the fake item DB. Out-of-range windows are empty.
pub fn list_items(params: &BoundObject) -> Value {
    let skip = params.get_i64("skip").unwrap_or(0).max(0) as usize;
    let limit = params.get_i64("limit").unwrap_or(10).max(0) as usize;
    FAKE_ITEMS_DB
        .iter()
        .skip(skip)
        .take(limit)
        .map(|name| json!({"item_name": name}))
        .collect()
}

/// Echoes the item, adding `price_with_tax` when a nonzero tax is set.
pub fn create_item(item: &BoundObject) -> Value {
    let mut out = item.to_json();
    let tax = item.get_f64("tax").filter(|tax| *tax != 0.0);
    if let (Some(tax), Some(price)) = (tax, item.get_f64("price")) {
        out["price_with_tax"] = json!(price + tax);
    }
    out
}

/// Wraps every bound parameter under its name, as the update
/// operations respond.
pub fn echo_params(params: &BoundObject) -> Value {
    let mut out = serde_json::Map::new();
    for (name, value) in params.fields() {
        if value.is_null() && !params.is_set(name) {
            continue;
        }
        out.insert(name.to_string(), value.to_json());
    }
    Value::Object(out)
}

/// Stored items served by the response-shaping operations.
pub fn stored_items() -> HashMap<&'static str, Value> {
    HashMap::from([
        ("foo", json!({"name": "Foo", "price": 50.2})),
        (
            "bar",
            json!({"name": "Bar", "description": "The bartenders", "price": 62, "tax": 20.2}),
        ),
        (
            "baz",
            json!({
                "name": "Baz",
                "description": null,
                "price": 50.2,
                "tax": 10.5,
                "tags": [],
                "image": {"url": "asd", "name": "asdad"}
            }),
        ),
    ])
}

/// Raw stored item by id.
pub fn stored_item(item_id: &str) -> ApiResult<Value> {
    stored_items()
        .remove(item_id)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

/// Stored item wrapped as `{"item": ...}`.
pub fn read_stored_item(params: &BoundObject) -> ApiResult<Value> {
    let item = stored_item(params.get_str("item_id").unwrap_or_default())?;
    Ok(json!({ "item": item }))
}

/// Refuses item 3.
pub fn read_item_teapot(params: &BoundObject) -> ApiResult<Value> {
    match params.get_i64("item_id") {
        Some(3) => Err(ApiError::http(StatusCode::IM_A_TEAPOT, "Nope! I don't like 3.")),
        item_id => Ok(json!({ "item_id": item_id })),
    }
}

pub fn create_invoice(_params: &BoundObject) -> Value {
    json!({"msg": "Invoice received"})
}

/// Shared query parameters of the listing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonParams {
    pub q: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// Extracts [`CommonParams`] from a bound `CommonParams` schema.
pub fn common_parameters(params: &BoundObject) -> CommonParams {
    CommonParams {
        q: params.get_str("q").map(str::to_string),
        skip: params.get_i64("skip").unwrap_or(0),
        limit: params.get_i64("limit").unwrap_or(100),
    }
}

/// Tests whether the `q` parameter contains a fixed fragment.
#[derive(Debug, Clone)]
pub struct FixedContentQueryChecker {
    fixed_content: String,
}

impl FixedContentQueryChecker {
    pub fn new(fixed_content: impl Into<String>) -> Self {
        Self {
            fixed_content: fixed_content.into(),
        }
    }

    /// An empty query never matches.
    pub fn check(&self, q: &str) -> bool {
        !q.is_empty() && q.contains(&self.fixed_content)
    }

    pub fn read_query_check(&self, params: &BoundObject) -> Value {
        let included = self.check(params.get_str("q").unwrap_or_default());
        json!({ "fixed_content_in_query": included })
    }
}

/// In-memory task table for the get-or-create operation.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: HashMap<String, String>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self {
            tasks: HashMap::from([("foo".to_string(), "Listen to the Bar Fighters".to_string())]),
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns 200 with the existing task, or creates it and returns 201.
    pub fn get_or_create(&mut self, task_id: &str) -> (StatusCode, String) {
        match self.tasks.get(task_id) {
            Some(task) => (StatusCode::OK, task.clone()),
            None => {
                let task = "This didn't exist before".to_string();
                self.tasks.insert(task_id.to_string(), task.clone());
                (StatusCode::CREATED, task)
            }
        }
    }
}

/// Mapping entries in bound order, as `key → value` JSON.
pub fn index_weights(params: &BoundObject) -> Value {
    match params.get("weights") {
        Some(weights @ BoundValue::Map(_)) => weights.to_json(),
        _ => json!({}),
    }
}
