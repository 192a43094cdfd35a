//! Schema type definitions
//!
//! Supported field types:
//! - string, int (i64), float (f64), bool
//! - datetime (RFC 3339), uuid, url (absolute http/https), email
//! - enum: closed list of string variants
//! - object: nested schema referenced by registered name
//! - sequence / set: homogeneous collections
//! - mapping: keyed collection with scalar key type
//! - any: raw JSON passthrough

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// Where a field's raw value comes from in an inbound request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    /// Path segment
    Path,
    /// Query string parameter (may repeat)
    Query,
    /// Request header (case-insensitive, may repeat)
    Header,
    /// JSON request body
    #[default]
    Body,
}

impl ParamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSource::Path => "path",
            ParamSource::Query => "query",
            ParamSource::Header => "header",
            ParamSource::Body => "body",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// RFC 3339 timestamp
    Datetime,
    /// UUID in hyphenated form
    Uuid,
    /// Absolute http(s) URL
    Url,
    /// Email address
    Email,
    /// One of a closed set of string variants
    Enum {
        variants: Vec<String>,
    },
    /// Nested schema, resolved through the registry by name
    Object {
        schema: String,
    },
    /// Ordered list of elements
    Sequence {
        items: Box<FieldType>,
    },
    /// List of elements with duplicates removed (first occurrence wins)
    Set {
        items: Box<FieldType>,
    },
    /// String-keyed map; keys are coerced through `keys`
    Mapping {
        keys: Box<FieldType>,
        values: Box<FieldType>,
    },
    /// Raw JSON, accepted as-is
    Any,
}

impl FieldType {
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn object(schema: impl Into<String>) -> Self {
        FieldType::Object {
            schema: schema.into(),
        }
    }

    pub fn sequence(items: FieldType) -> Self {
        FieldType::Sequence {
            items: Box::new(items),
        }
    }

    pub fn set(items: FieldType) -> Self {
        FieldType::Set {
            items: Box::new(items),
        }
    }

    pub fn mapping(keys: FieldType, values: FieldType) -> Self {
        FieldType::Mapping {
            keys: Box::new(keys),
            values: Box::new(values),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Datetime => "datetime",
            FieldType::Uuid => "uuid",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Enum { .. } => "enum",
            FieldType::Object { .. } => "object",
            FieldType::Sequence { .. } => "sequence",
            FieldType::Set { .. } => "set",
            FieldType::Mapping { .. } => "mapping",
            FieldType::Any => "any",
        }
    }

    /// Human readable description of what a value must look like.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Enum { variants } => {
                let quoted: Vec<String> = variants.iter().map(|v| format!("'{}'", v)).collect();
                format!("one of {}", quoted.join(", "))
            }
            FieldType::Object { schema } => format!("object '{}'", schema),
            FieldType::Sequence { items } => format!("sequence of {}", items.describe()),
            FieldType::Set { items } => format!("set of {}", items.describe()),
            FieldType::Mapping { keys, values } => {
                format!("mapping of {} to {}", keys.describe(), values.describe())
            }
            other => other.type_name().to_string(),
        }
    }

    /// Whether repeated query/header keys should be collected into this type.
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::Sequence { .. } | FieldType::Set { .. })
    }

    /// Whether this type may serve as a mapping key.
    pub fn is_key_type(&self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Int
                | FieldType::Float
                | FieldType::Bool
                | FieldType::Uuid
                | FieldType::Enum { .. }
        )
    }

    /// Name of the schema reached through this type, looking through collections.
    pub fn nested_schema(&self) -> Option<&str> {
        match self {
            FieldType::Object { schema } => Some(schema),
            FieldType::Sequence { items } | FieldType::Set { items } => items.nested_schema(),
            FieldType::Mapping { values, .. } => values.nested_schema(),
            _ => None,
        }
    }
}

/// A compiled regular expression that serializes as its source text.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> SchemaResult<Self> {
        Regex::new(source)
            .map(|regex| Self { regex })
            .map_err(|e| SchemaError::invalid_pattern(source, e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Matches anchored at the start of `value`; the end is free unless
    /// the pattern ends in `$`.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.find(value).is_some_and(|m| m.start() == 0)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(|regex| Pattern { regex })
            .map_err(serde::de::Error::custom)
    }
}

/// Value constraints, checked in declaration order:
/// length bounds, numeric bounds, pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.has_no_numeric_bounds()
            && self.pattern.is_none()
    }

    fn has_no_numeric_bounds(&self) -> bool {
        self.ge.is_none() && self.le.is_none() && self.gt.is_none() && self.lt.is_none()
    }
}

fn default_true() -> bool {
    true
}

// An explicit `"default": null` must stay `Some(Null)` so the field remains optional.
fn deserialize_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Declarative description of one field.
///
/// A field is required exactly when it has no default, so a field with a
/// default can never be required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the key of the bound value
    pub name: String,
    /// Declared type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Value used when the input omits the field
    #[serde(
        default,
        deserialize_with = "deserialize_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Whether an explicit `null` is accepted
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(flatten)]
    pub constraints: Constraints,
    /// External key used for lookup instead of `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default)]
    pub source: ParamSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// For a lone body field: read it from the body under its key
    /// instead of taking the whole body
    #[serde(default, skip_serializing_if = "is_false")]
    pub embed: bool,
    /// For headers: look `user_agent` up as `user-agent`
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub convert_underscores: bool,
}

impl FieldSpec {
    /// Creates a required body field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            nullable: false,
            constraints: Constraints::default(),
            alias: None,
            deprecated: false,
            source: ParamSource::Body,
            title: None,
            description: None,
            embed: false,
            convert_underscores: true,
        }
    }

    pub fn path(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type).source(ParamSource::Path)
    }

    pub fn query(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type).source(ParamSource::Query)
    }

    pub fn header(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type).source(ParamSource::Header)
    }

    pub fn source(mut self, source: ParamSource) -> Self {
        self.source = source;
        self
    }

    /// Sets a default, making the field optional.
    pub fn default(mut self, value: Value) -> Self {
        if value.is_null() {
            self.nullable = true;
        }
        self.default = Some(value);
        self
    }

    /// Optional field defaulting to `null`.
    pub fn default_null(self) -> Self {
        self.default(Value::Null)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn embed(mut self) -> Self {
        self.embed = true;
        self
    }

    pub fn keep_underscores(mut self) -> Self {
        self.convert_underscores = false;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.constraints.pattern = Some(pattern);
        self
    }

    /// A field is required exactly when it has no default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable || matches!(self.default, Some(Value::Null))
    }

    /// Key used to look the field up in raw input: the alias if present,
    /// otherwise the name.
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Header name for header-sourced fields.
    pub fn header_key(&self) -> String {
        match &self.alias {
            Some(alias) => alias.to_ascii_lowercase(),
            None if self.convert_underscores => self.name.replace('_', "-").to_ascii_lowercase(),
            None => self.name.to_ascii_lowercase(),
        }
    }
}

/// Handling of keys not declared by a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Silently drop undeclared keys
    #[default]
    Ignore,
    /// Report every undeclared key as an error
    Forbid,
}

/// Named, ordered collection of fields. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub extra: ExtraPolicy,
    pub fields: Vec<FieldSpec>,
}

impl SchemaSpec {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            spec: SchemaSpec {
                name: name.into(),
                description: None,
                extra: ExtraPolicy::Ignore,
                fields: Vec::new(),
            },
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields read from the request body.
    pub fn body_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.source == ParamSource::Body)
    }

    /// Validates the schema structure itself (not a value).
    pub fn validate_structure(&self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::invalid_schema(&self.name, "schema name must not be empty"));
        }

        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::invalid_schema(&self.name, "field name must not be empty"));
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::invalid_schema(
                    &self.name,
                    format!("duplicate field '{}'", field.name),
                ));
            }
            if !keys.insert((field.source, field.lookup_key())) {
                return Err(SchemaError::invalid_schema(
                    &self.name,
                    format!("lookup key '{}' is used twice in {}", field.lookup_key(), field.source),
                ));
            }
            check_type(&self.name, &field.name, &field.field_type)?;
            check_constraints(&self.name, field)?;

            if field.source == ParamSource::Path && !field.is_required() {
                return Err(SchemaError::invalid_schema(
                    &self.name,
                    format!("path parameter '{}' cannot have a default", field.name),
                ));
            }
        }

        Ok(())
    }
}

fn check_type(schema: &str, field: &str, field_type: &FieldType) -> SchemaResult<()> {
    match field_type {
        FieldType::Enum { variants } if variants.is_empty() => Err(SchemaError::invalid_schema(
            schema,
            format!("enum field '{}' declares no variants", field),
        )),
        FieldType::Sequence { items } | FieldType::Set { items } => check_type(schema, field, items),
        FieldType::Mapping { keys, values } => {
            if !keys.is_key_type() {
                return Err(SchemaError::invalid_schema(
                    schema,
                    format!("mapping field '{}' cannot use {} keys", field, keys.type_name()),
                ));
            }
            check_type(schema, field, values)
        }
        _ => Ok(()),
    }
}

fn check_constraints(schema: &str, field: &FieldSpec) -> SchemaResult<()> {
    let c = &field.constraints;
    if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
        if min > max {
            return Err(SchemaError::invalid_schema(
                schema,
                format!("field '{}': min_length {} exceeds max_length {}", field.name, min, max),
            ));
        }
    }
    for bound in [c.ge, c.le, c.gt, c.lt].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(SchemaError::invalid_schema(
                schema,
                format!("field '{}': numeric bounds must be finite", field.name),
            ));
        }
    }
    Ok(())
}

/// Builder for [`SchemaSpec`]. `build` runs the structural checks.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    spec: SchemaSpec,
}

impl SchemaBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    pub fn forbid_extra(mut self) -> Self {
        self.spec.extra = ExtraPolicy::Forbid;
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.spec.fields.push(field);
        self
    }

    pub fn build(self) -> SchemaResult<SchemaSpec> {
        self.spec.validate_structure()?;
        Ok(self.spec)
    }
}
