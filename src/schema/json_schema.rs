//! JSON Schema rendering of registered schemas
//!
//! Nested schemas are emitted as `$ref: "#/definitions/<name>"` and collected
//! under `definitions` of the top-level document.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use super::errors::SchemaResult;
use super::registry::SchemaRegistry;
use super::types::{ExtraPolicy, FieldSpec, FieldType, ParamSource, SchemaSpec};

/// Renders `name` and every schema it references.
pub fn to_json_schema(registry: &SchemaRegistry, name: &str) -> SchemaResult<Value> {
    let root = registry.get(name)?;
    let mut document = object_schema(root);

    let mut definitions = Map::new();
    let mut pending: Vec<String> = referenced(root).into_iter().collect();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    seen.insert(root.name.clone());

    while let Some(next) = pending.pop() {
        if !seen.insert(next.clone()) {
            continue;
        }
        let schema = registry.get(&next)?;
        pending.extend(referenced(schema));
        definitions.insert(next, object_schema(schema));
    }

    if !definitions.is_empty() {
        if let Value::Object(map) = &mut document {
            map.insert("definitions".into(), Value::Object(definitions));
        }
    }
    Ok(document)
}

fn referenced(schema: &SchemaSpec) -> BTreeSet<String> {
    schema
        .fields
        .iter()
        .filter_map(|f| f.field_type.nested_schema())
        .map(str::to_string)
        .collect()
}

fn object_schema(schema: &SchemaSpec) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in &schema.fields {
        properties.insert(field.lookup_key().to_string(), property(field));
        if field.is_required() {
            required.push(Value::String(field.lookup_key().to_string()));
        }
    }

    let mut out = Map::new();
    out.insert("title".into(), json!(schema.name));
    out.insert("type".into(), json!("object"));
    if let Some(description) = &schema.description {
        out.insert("description".into(), json!(description));
    }
    out.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        out.insert("required".into(), Value::Array(required));
    }
    if schema.extra == ExtraPolicy::Forbid {
        out.insert("additionalProperties".into(), json!(false));
    }
    Value::Object(out)
}

fn property(field: &FieldSpec) -> Value {
    let mut out = match type_schema(&field.field_type) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    out.insert(
        "title".into(),
        json!(field.title.clone().unwrap_or_else(|| title_case(&field.name))),
    );
    if let Some(description) = &field.description {
        out.insert("description".into(), json!(description));
    }
    if field.deprecated {
        out.insert("deprecated".into(), json!(true));
    }
    if let Some(default) = &field.default {
        if !default.is_null() {
            out.insert("default".into(), default.clone());
        }
    }
    if field.source != ParamSource::Body {
        out.insert("x-source".into(), json!(field.source.as_str()));
    }

    let c = &field.constraints;
    let (min_key, max_key) = if field.field_type.is_collection() {
        ("minItems", "maxItems")
    } else {
        ("minLength", "maxLength")
    };
    if let Some(min) = c.min_length {
        out.insert(min_key.into(), json!(min));
    }
    if let Some(max) = c.max_length {
        out.insert(max_key.into(), json!(max));
    }
    if let Some(ge) = c.ge {
        out.insert("minimum".into(), json!(ge));
    }
    if let Some(le) = c.le {
        out.insert("maximum".into(), json!(le));
    }
    if let Some(gt) = c.gt {
        out.insert("exclusiveMinimum".into(), json!(gt));
    }
    if let Some(lt) = c.lt {
        out.insert("exclusiveMaximum".into(), json!(lt));
    }
    if let Some(pattern) = &c.pattern {
        out.insert("pattern".into(), json!(pattern.as_str()));
    }

    Value::Object(out)
}

fn type_schema(field_type: &FieldType) -> Value {
    match field_type {
        FieldType::String => json!({"type": "string"}),
        FieldType::Int => json!({"type": "integer"}),
        FieldType::Float => json!({"type": "number"}),
        FieldType::Bool => json!({"type": "boolean"}),
        FieldType::Datetime => json!({"type": "string", "format": "date-time"}),
        FieldType::Uuid => json!({"type": "string", "format": "uuid"}),
        FieldType::Url => json!({"type": "string", "format": "uri"}),
        FieldType::Email => json!({"type": "string", "format": "email"}),
        FieldType::Enum { variants } => json!({"type": "string", "enum": variants}),
        FieldType::Object { schema } => json!({"$ref": format!("#/definitions/{}", schema)}),
        FieldType::Sequence { items } => json!({"type": "array", "items": type_schema(items)}),
        FieldType::Set { items } => {
            json!({"type": "array", "uniqueItems": true, "items": type_schema(items)})
        }
        FieldType::Mapping { values, .. } => {
            json!({"type": "object", "additionalProperties": type_schema(values)})
        }
        FieldType::Any => json!({}),
    }
}

/// `full_name` -> `Full Name`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
