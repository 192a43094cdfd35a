//! Bound values
//!
//! A [`BoundObject`] is the typed result of binding raw input against a
//! schema. Alongside the field values it carries the set of fields that were
//! explicitly provided, so that defaults filled in by the binder can later be
//! told apart from values the producer chose.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// A typed value produced by the binder.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Strings, enum variants, URLs and emails
    Str(String),
    DateTime(DateTime<FixedOffset>),
    Uuid(Uuid),
    /// Sequences and (deduplicated) sets
    Seq(Vec<BoundValue>),
    /// Mapping entries in input order, keys in canonical string form
    Map(Vec<(String, BoundValue)>),
    Object(BoundObject),
    /// Untyped JSON accepted as-is
    Raw(Value),
}

impl BoundValue {
    /// Structural conversion without a schema.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => BoundValue::Null,
            Value::Bool(b) => BoundValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => BoundValue::Int(i),
                None => BoundValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => BoundValue::Str(s.clone()),
            Value::Array(items) => BoundValue::Seq(items.iter().map(BoundValue::from_json).collect()),
            Value::Object(map) => BoundValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), BoundValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Serializes into JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            BoundValue::Null => Value::Null,
            BoundValue::Bool(b) => Value::Bool(*b),
            BoundValue::Int(i) => Value::Number((*i).into()),
            BoundValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            BoundValue::Str(s) => Value::String(s.clone()),
            BoundValue::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            BoundValue::Uuid(u) => Value::String(u.to_string()),
            BoundValue::Seq(items) => Value::Array(items.iter().map(BoundValue::to_json).collect()),
            BoundValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            BoundValue::Object(obj) => obj.to_json(),
            BoundValue::Raw(value) => value.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BoundValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BoundValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; ints widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BoundValue::Int(i) => Some(*i as f64),
            BoundValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoundValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[BoundValue]> {
        match self {
            BoundValue::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BoundObject> {
        match self {
            BoundValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Length used by length constraints: characters, elements or entries.
    pub(crate) fn length(&self) -> Option<usize> {
        match self {
            BoundValue::Str(s) => Some(s.chars().count()),
            BoundValue::Seq(items) => Some(items.len()),
            BoundValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Copies explicitly-set markers from a structurally matching value.
    pub(crate) fn inherit_markers(&mut self, source: &BoundValue) {
        match (self, source) {
            (BoundValue::Object(obj), BoundValue::Object(src)) => obj.inherit_markers(src),
            (BoundValue::Seq(items), BoundValue::Seq(src)) => {
                for (item, original) in items.iter_mut().zip(src) {
                    item.inherit_markers(original);
                }
            }
            (BoundValue::Map(entries), BoundValue::Map(src)) => {
                for ((_, item), (_, original)) in entries.iter_mut().zip(src) {
                    item.inherit_markers(original);
                }
            }
            _ => {}
        }
    }

    /// Human readable rendering used in error reports.
    pub(crate) fn render(&self) -> String {
        match self {
            BoundValue::Str(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

/// A bound object: every declared field, in declaration order, plus the
/// explicitly-set markers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundObject {
    schema: String,
    fields: Vec<(String, BoundValue)>,
    explicitly_set: BTreeSet<String>,
}

impl BoundObject {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: Vec::new(),
            explicitly_set: BTreeSet::new(),
        }
    }

    /// Name of the schema this object was bound against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Sets a field and marks it explicitly set.
    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        let name = name.into();
        self.explicitly_set.insert(name.clone());
        self.put(name, value);
    }

    /// Sets a field without marking it explicitly set.
    pub fn insert_default(&mut self, name: impl Into<String>, value: BoundValue) {
        let name = name.into();
        self.explicitly_set.remove(&name);
        self.put(name, value);
    }

    fn put(&mut self, name: String, value: BoundValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Convenience accessor for string fields; `None` for null or other types.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(BoundValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(BoundValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(BoundValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(BoundValue::as_bool)
    }

    /// Whether the producer explicitly provided this field.
    pub fn is_set(&self, name: &str) -> bool {
        self.explicitly_set.contains(name)
    }

    pub fn explicitly_set(&self) -> impl Iterator<Item = &str> {
        self.explicitly_set.iter().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keeps only the markers `source` also has, recursing into nested values.
    ///
    /// Used when an object bound against one schema is re-bound against
    /// another: the producer's choices must survive the conversion.
    pub(crate) fn inherit_markers(&mut self, source: &BoundObject) {
        self.explicitly_set.retain(|name| source.is_set(name));
        for (name, value) in &mut self.fields {
            if let Some(original) = source.get(name) {
                value.inherit_markers(original);
            }
        }
    }

    /// Full serialization: every field, no filtering.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}
