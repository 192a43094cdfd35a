//! Request binder
//!
//! Binding semantics:
//! - Each field is looked up by alias, falling back to its name, in the
//!   source it declares (path, query, header or body)
//! - Missing required fields are reported; missing optional fields take
//!   their default and are not marked explicitly set
//! - Present values are coerced, then checked against length bounds,
//!   numeric bounds and pattern, in that order; the first failure wins
//! - Nested objects and collection elements are bound recursively and every
//!   failure is collected
//!
//! Binding is atomic: if any field fails, no value is returned.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::coerce::{coerce_scalar, key_string};
use super::errors::{BindResult, FieldError, ValidationError};
use super::inputs::RawInputs;
use super::value::{BoundObject, BoundValue};
use crate::schema::{
    Constraints, ExtraPolicy, FieldSpec, FieldType, ParamSource, SchemaRegistry, SchemaResult, SchemaSpec,
};

/// Binds raw inputs against schemas of a registry.
///
/// The binder holds no state of its own; one instance can serve any number
/// of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestBinder<'a> {
    registry: &'a SchemaRegistry,
}

/// Shared context for one bind call.
struct Scope<'e> {
    location: ParamSource,
    keys: KeyMode,
    errors: &'e mut Vec<FieldError>,
}

/// How object fields are keyed in JSON input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum KeyMode {
    /// External keys: alias, falling back to name
    Lookup,
    /// Field names, as produced by `BoundObject::to_json`
    Name,
}

impl KeyMode {
    fn key_of(self, field: &FieldSpec) -> &str {
        match self {
            KeyMode::Lookup => field.lookup_key(),
            KeyMode::Name => &field.name,
        }
    }
}

impl<'a> RequestBinder<'a> {
    /// Creates a new binder backed by the given registry.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Binds request inputs against the named schema.
    ///
    /// # Errors
    ///
    /// - `BindError::Schema` if the schema (or a nested one) is not registered
    /// - `BindError::Validation` carrying every field failure otherwise
    pub fn bind(&self, schema_name: &str, inputs: &RawInputs) -> BindResult<BoundObject> {
        let schema = self.registry.get(schema_name)?;
        self.bind_schema(schema, inputs)
    }

    /// Binds request inputs against a schema value.
    pub fn bind_schema(&self, schema: &SchemaSpec, inputs: &RawInputs) -> BindResult<BoundObject> {
        let mut errors = Vec::new();
        let mut object = BoundObject::new(&schema.name);

        let body_fields: Vec<&FieldSpec> = schema.body_fields().collect();
        // A lone, non-embedded body field receives the whole body.
        let whole_body = body_fields.len() == 1 && !body_fields[0].embed;

        let body_map = match (inputs.body(), whole_body, body_fields.is_empty()) {
            (Some(Value::Object(map)), false, false) => Some(map),
            (Some(other), false, false) => {
                errors.push(FieldError::type_mismatch(
                    ParamSource::Body,
                    "",
                    format!("object, got {}", json_type_name(other)),
                ));
                None
            }
            _ => None,
        };

        if let (Some(map), ExtraPolicy::Forbid) = (body_map, schema.extra) {
            for key in map.keys() {
                if !body_fields.iter().any(|f| f.lookup_key() == key) {
                    errors.push(FieldError::extra(ParamSource::Body, key.clone()));
                }
            }
        }

        for field in &schema.fields {
            let raw: Option<Value> = match field.source {
                ParamSource::Path => inputs
                    .path_param(field.lookup_key())
                    .map(|v| Value::String(v.to_string())),
                ParamSource::Query => repeated(&field.field_type, inputs.query_values(field.lookup_key())),
                ParamSource::Header => repeated(&field.field_type, inputs.header_values(&field.header_key())),
                ParamSource::Body if whole_body => inputs.body().cloned(),
                ParamSource::Body => body_map.and_then(|m| m.get(field.lookup_key())).cloned(),
            };

            if raw.is_some() && field.deprecated {
                warn!(schema = %schema.name, field = %field.name, "deprecated parameter used");
            }

            // The whole-body field reports nested paths relative to the body root.
            let path = if field.source == ParamSource::Body && whole_body {
                String::new()
            } else {
                field.lookup_key().to_string()
            };

            let mut scope = Scope {
                location: field.source,
                keys: KeyMode::Lookup,
                errors: &mut errors,
            };
            let missing_path = if path.is_empty() { field.lookup_key() } else { path.as_str() };
            match raw {
                Some(raw) => {
                    if let Some(value) = self.bind_field(field, &raw, &path, &mut scope)? {
                        object.insert(&field.name, value);
                    }
                }
                None => match &field.default {
                    Some(default) => {
                        object.insert_default(&field.name, self.default_value(field, default)?);
                    }
                    None => scope.errors.push(FieldError::missing(field.source, missing_path)),
                },
            }
        }

        if errors.is_empty() {
            debug!(schema = %schema.name, set = object.explicitly_set().count(), "bind succeeded");
            Ok(object)
        } else {
            warn!(schema = %schema.name, errors = errors.len(), "bind rejected");
            Err(ValidationError::new(&schema.name, errors).into())
        }
    }

    /// Binds a JSON object against the named schema, reading every field
    /// from it regardless of declared source.
    ///
    /// Keys present in `value` are marked explicitly set.
    pub fn bind_json(&self, schema_name: &str, value: &Value) -> BindResult<BoundObject> {
        self.bind_keyed(schema_name, value, KeyMode::Lookup)
    }

    /// Re-binds an already bound object against another schema, matching
    /// fields by name at every level. Markers are those of a fresh bind;
    /// callers carry the original ones over.
    pub(crate) fn rebind(&self, schema_name: &str, value: &BoundObject) -> BindResult<BoundObject> {
        self.bind_keyed(schema_name, &value.to_json(), KeyMode::Name)
    }

    fn bind_keyed(&self, schema_name: &str, value: &Value, keys: KeyMode) -> BindResult<BoundObject> {
        let schema = self.registry.get(schema_name)?;
        let mut errors = Vec::new();
        let mut scope = Scope {
            location: ParamSource::Body,
            keys,
            errors: &mut errors,
        };

        let bound = match value {
            Value::Object(map) => self.bind_object(schema, map, "", &mut scope)?,
            other => {
                scope.errors.push(FieldError::type_mismatch(
                    ParamSource::Body,
                    "",
                    format!("object, got {}", json_type_name(other)),
                ));
                None
            }
        };

        match bound {
            Some(object) if errors.is_empty() => Ok(object),
            _ => Err(ValidationError::new(&schema.name, errors).into()),
        }
    }

    /// Binds one present field value: null handling, coercion, constraints.
    fn bind_field(
        &self,
        field: &FieldSpec,
        raw: &Value,
        path: &str,
        scope: &mut Scope<'_>,
    ) -> SchemaResult<Option<BoundValue>> {
        if raw.is_null() {
            if field.is_nullable() {
                return Ok(Some(BoundValue::Null));
            }
            scope.errors.push(FieldError::type_mismatch(
                scope.location,
                display_path(path, field),
                format!("{}, got null", field.field_type.describe()),
            ));
            return Ok(None);
        }

        let Some(value) = self.bind_value(&field.field_type, raw, path, scope)? else {
            return Ok(None);
        };

        if let Some(violation) = check_constraints(&field.constraints, &value) {
            scope.errors.push(FieldError::constraint(
                scope.location,
                display_path(path, field),
                violation,
                value.render(),
            ));
            return Ok(None);
        }

        Ok(Some(value))
    }

    /// Binds a value of any declared type. Failures are pushed to the scope;
    /// `None` means at least one failure was recorded.
    fn bind_value(
        &self,
        field_type: &FieldType,
        raw: &Value,
        path: &str,
        scope: &mut Scope<'_>,
    ) -> SchemaResult<Option<BoundValue>> {
        match field_type {
            FieldType::Object { schema } => {
                let nested = self.registry.get(schema)?;
                match raw {
                    Value::Object(map) => Ok(self.bind_object(nested, map, path, scope)?.map(BoundValue::Object)),
                    other => {
                        self.mismatch(field_type, other, path, scope);
                        Ok(None)
                    }
                }
            }
            FieldType::Sequence { items } | FieldType::Set { items } => {
                let Value::Array(elements) = raw else {
                    self.mismatch(field_type, raw, path, scope);
                    return Ok(None);
                };

                let mut bound = Vec::with_capacity(elements.len());
                let mut failed = false;
                for (i, element) in elements.iter().enumerate() {
                    let element_path = format!("{}[{}]", path, i);
                    match self.bind_element(items, element, &element_path, scope)? {
                        Some(value) => bound.push(value),
                        None => failed = true,
                    }
                }
                if failed {
                    return Ok(None);
                }

                if matches!(field_type, FieldType::Set { .. }) {
                    let mut unique: Vec<BoundValue> = Vec::with_capacity(bound.len());
                    for value in bound {
                        if !unique.contains(&value) {
                            unique.push(value);
                        }
                    }
                    bound = unique;
                }
                Ok(Some(BoundValue::Seq(bound)))
            }
            FieldType::Mapping { keys, values } => {
                let Value::Object(entries) = raw else {
                    self.mismatch(field_type, raw, path, scope);
                    return Ok(None);
                };

                let mut bound = Vec::with_capacity(entries.len());
                let mut failed = false;
                for (key, element) in entries {
                    let entry_path = format!("{}[{}]", path, key);
                    let Some(key_value) = coerce_scalar(&Value::String(key.clone()), keys) else {
                        scope.errors.push(FieldError::type_mismatch(
                            scope.location,
                            entry_path,
                            format!("{} key", keys.describe()),
                        ));
                        failed = true;
                        continue;
                    };
                    // Keys equal after coercion ("1", "01") collapse, last wins.
                    let key = key_string(&key_value);
                    match self.bind_element(values, element, &entry_path, scope)? {
                        Some(value) => match bound.iter_mut().find(|(k, _)| *k == key) {
                            Some(slot) => slot.1 = value,
                            None => bound.push((key, value)),
                        },
                        None => failed = true,
                    }
                }
                Ok((!failed).then_some(BoundValue::Map(bound)))
            }
            scalar => match coerce_scalar(raw, scalar) {
                Some(value) => Ok(Some(value)),
                None => {
                    self.mismatch(scalar, raw, path, scope);
                    Ok(None)
                }
            },
        }
    }

    /// Collection elements: `null` is only accepted by `any`.
    fn bind_element(
        &self,
        field_type: &FieldType,
        raw: &Value,
        path: &str,
        scope: &mut Scope<'_>,
    ) -> SchemaResult<Option<BoundValue>> {
        if raw.is_null() && *field_type != FieldType::Any {
            scope.errors.push(FieldError::type_mismatch(
                scope.location,
                path,
                format!("{}, got null", field_type.describe()),
            ));
            return Ok(None);
        }
        self.bind_value(field_type, raw, path, scope)
    }

    /// Binds a nested JSON object. Keys present are marked explicitly set.
    fn bind_object(
        &self,
        schema: &SchemaSpec,
        map: &Map<String, Value>,
        prefix: &str,
        scope: &mut Scope<'_>,
    ) -> SchemaResult<Option<BoundObject>> {
        let before = scope.errors.len();
        let mut object = BoundObject::new(&schema.name);

        if schema.extra == ExtraPolicy::Forbid {
            for key in map.keys() {
                if !schema.fields.iter().any(|f| scope.keys.key_of(f) == key) {
                    scope.errors.push(FieldError::extra(scope.location, join_path(prefix, key)));
                }
            }
        }

        for field in &schema.fields {
            let key = scope.keys.key_of(field);
            let path = join_path(prefix, key);
            match map.get(key) {
                Some(raw) => {
                    if let Some(value) = self.bind_field(field, raw, &path, scope)? {
                        object.insert(&field.name, value);
                    }
                }
                None => match &field.default {
                    Some(default) => object.insert_default(&field.name, self.default_value(field, default)?),
                    None => scope.errors.push(FieldError::missing(scope.location, path)),
                },
            }
        }

        Ok((scope.errors.len() == before).then_some(object))
    }

    /// Converts a declared default into a typed value. Defaults that do not
    /// fit their declared type are kept structurally.
    fn default_value(&self, field: &FieldSpec, default: &Value) -> SchemaResult<BoundValue> {
        if default.is_null() {
            return Ok(BoundValue::Null);
        }
        let mut scratch = Vec::new();
        let mut scope = Scope {
            location: field.source,
            keys: KeyMode::Lookup,
            errors: &mut scratch,
        };
        Ok(self
            .bind_value(&field.field_type, default, &field.name, &mut scope)?
            .unwrap_or_else(|| BoundValue::from_json(default)))
    }

    fn mismatch(&self, expected: &FieldType, raw: &Value, path: &str, scope: &mut Scope<'_>) {
        scope.errors.push(FieldError::type_mismatch(
            scope.location,
            path,
            format!("{}, got {}", expected.describe(), json_type_name(raw)),
        ));
    }
}

/// Repeated query/header values: collections take all, scalars take the last.
fn repeated(field_type: &FieldType, values: Vec<&str>) -> Option<Value> {
    if values.is_empty() {
        return None;
    }
    if field_type.is_collection() {
        Some(Value::Array(
            values.into_iter().map(|v| Value::String(v.to_string())).collect(),
        ))
    } else {
        values.last().map(|v| Value::String(v.to_string()))
    }
}

/// Returns the name of the first violated constraint, if any.
fn check_constraints(constraints: &Constraints, value: &BoundValue) -> Option<&'static str> {
    if let Some(len) = value.length() {
        if constraints.min_length.is_some_and(|min| len < min) {
            return Some("min_length");
        }
        if constraints.max_length.is_some_and(|max| len > max) {
            return Some("max_length");
        }
    }

    if let Some(n) = value.as_f64() {
        if constraints.ge.is_some_and(|bound| n < bound) {
            return Some("ge");
        }
        if constraints.le.is_some_and(|bound| n > bound) {
            return Some("le");
        }
        if constraints.gt.is_some_and(|bound| n <= bound) {
            return Some("gt");
        }
        if constraints.lt.is_some_and(|bound| n >= bound) {
            return Some("lt");
        }
    }

    if let (Some(pattern), Some(text)) = (&constraints.pattern, value.as_str()) {
        if !pattern.is_match(text) {
            return Some("pattern");
        }
    }

    None
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn display_path<'p>(path: &'p str, field: &'p FieldSpec) -> &'p str {
    if path.is_empty() {
        field.lookup_key()
    } else {
        path
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
