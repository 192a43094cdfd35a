//! Response shaper
//!
//! Serializes a bound value through a response schema. Only fields the
//! response schema declares are emitted, in declaration order, so a value
//! bound against a wider schema (`UserIn`) can be shaped as a narrower one
//! (`UserOut`) without leaking the extra fields.

use serde_json::{Map, Value};
use tracing::debug;

use super::directive::{PathTree, ShapeDirective};
use super::errors::{ShapeError, ShapeResult};
use crate::binding::{BoundObject, BoundValue, FieldError, RequestBinder, ValidationError};
use crate::schema::{FieldType, SchemaRegistry, SchemaSpec};

/// Shapes outbound values against schemas of a registry.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShaper<'a> {
    registry: &'a SchemaRegistry,
}

/// Compiled include/exclude filters for one level of the output.
#[derive(Clone, Copy)]
struct Filter<'t> {
    include: Option<&'t PathTree>,
    exclude: Option<&'t PathTree>,
}

impl<'t> Filter<'t> {
    /// Filter for one field, or `None` if the field is filtered out.
    fn descend(&self, name: &str) -> Option<Filter<'t>> {
        let include = match self.include {
            None => None,
            Some(tree) => match tree.child(name) {
                None => return None,
                Some(child) if child.is_terminal() => None,
                Some(child) => Some(child),
            },
        };
        let exclude = match self.exclude.and_then(|tree| tree.child(name)) {
            Some(child) if child.is_terminal() => return None,
            other => other,
        };
        Some(Filter { include, exclude })
    }
}

impl<'a> ResponseShaper<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Shapes a bound object as the named response schema.
    ///
    /// # Errors
    ///
    /// - `ShapeError::IncludeExcludeConflict` / `InvalidPath` for a bad directive
    /// - `ShapeError::ResponseValidation` if `value` was bound against another
    ///   schema and does not satisfy this one
    pub fn shape(&self, schema_name: &str, value: &BoundObject, directive: &ShapeDirective) -> ShapeResult<Value> {
        let schema = self.registry.get(schema_name)?;
        let (include, exclude) = self.compile(schema, directive)?;
        let filter = Filter {
            include: include.as_ref(),
            exclude: exclude.as_ref(),
        };

        let shaped = if value.schema() == schema.name {
            self.shape_object(schema, value, filter, directive)?
        } else {
            let converted = self.convert(schema, value)?;
            self.shape_object(schema, &converted, filter, directive)?
        };

        debug!(schema = %schema.name, fields = shaped.len(), "shaped response");
        Ok(Value::Object(shaped))
    }

    /// Shapes a list of bound objects element-wise.
    pub fn shape_many(
        &self,
        schema_name: &str,
        values: &[BoundObject],
        directive: &ShapeDirective,
    ) -> ShapeResult<Value> {
        values
            .iter()
            .map(|value| self.shape(schema_name, value, directive))
            .collect::<ShapeResult<Vec<_>>>()
            .map(Value::Array)
    }

    /// Validates handler-produced JSON against the response schema, then
    /// shapes it. Keys present in the JSON count as explicitly set. A JSON
    /// array is validated and shaped element-wise.
    pub fn shape_raw(&self, schema_name: &str, raw: &Value, directive: &ShapeDirective) -> ShapeResult<Value> {
        let binder = RequestBinder::new(self.registry);
        match raw {
            Value::Array(elements) => {
                let mut bound = Vec::with_capacity(elements.len());
                let mut errors = Vec::new();
                for (i, element) in elements.iter().enumerate() {
                    match binder.bind_json(schema_name, element) {
                        Ok(object) => bound.push(object),
                        Err(err) => match err.as_validation() {
                            Some(batch) => errors.extend(batch.errors().iter().map(|e| prefixed(i, e))),
                            None => return Err(err.into()),
                        },
                    }
                }
                if !errors.is_empty() {
                    return Err(ShapeError::ResponseValidation(ValidationError::new(schema_name, errors)));
                }
                self.shape_many(schema_name, &bound, directive)
            }
            other => {
                let bound = binder.bind_json(schema_name, other)?;
                self.shape(schema_name, &bound, directive)
            }
        }
    }

    /// Parses and checks include/exclude paths against the schema.
    fn compile(
        &self,
        schema: &SchemaSpec,
        directive: &ShapeDirective,
    ) -> ShapeResult<(Option<PathTree>, Option<PathTree>)> {
        if !directive.include.is_empty() && !directive.exclude.is_empty() {
            return Err(ShapeError::IncludeExcludeConflict);
        }

        let mut compiled = [None, None];
        for (slot, paths) in compiled.iter_mut().zip([&directive.include, &directive.exclude]) {
            if paths.is_empty() {
                continue;
            }
            let tree = PathTree::parse(paths)?;
            for path in tree.paths() {
                self.resolve(schema, &path)?;
            }
            *slot = Some(tree);
        }

        let [include, exclude] = compiled;
        Ok((include, exclude))
    }

    /// Checks that every segment of a path names a declared field.
    fn resolve(&self, schema: &SchemaSpec, segments: &[&str]) -> ShapeResult<()> {
        let mut current = schema;
        for (i, segment) in segments.iter().enumerate() {
            let field = current.field(segment).ok_or_else(|| {
                ShapeError::invalid_path(
                    segments.join("."),
                    format!("'{}' is not a field of {}", segment, current.name),
                )
            })?;

            if i + 1 < segments.len() {
                let nested = element_type(&field.field_type).nested_schema().ok_or_else(|| {
                    ShapeError::invalid_path(segments.join("."), format!("'{}' is not a nested object", segment))
                })?;
                current = self.registry.get(nested)?;
            }
        }
        Ok(())
    }

    /// Re-binds an object bound against another schema, keeping the
    /// producer's explicitly-set markers.
    fn convert(&self, schema: &SchemaSpec, value: &BoundObject) -> ShapeResult<BoundObject> {
        let mut converted = RequestBinder::new(self.registry).rebind(&schema.name, value)?;
        converted.inherit_markers(value);
        Ok(converted)
    }

    fn shape_object(
        &self,
        schema: &SchemaSpec,
        object: &BoundObject,
        filter: Filter<'_>,
        directive: &ShapeDirective,
    ) -> ShapeResult<Map<String, Value>> {
        let mut out = Map::new();
        for field in &schema.fields {
            let Some(field_filter) = filter.descend(&field.name) else {
                continue;
            };
            let Some(value) = object.get(&field.name) else {
                continue;
            };

            if directive.exclude_unset && !object.is_set(&field.name) {
                continue;
            }
            if directive.exclude_none && value.is_null() {
                continue;
            }
            if directive.exclude_defaults && field.default.as_ref().is_some_and(|d| loosely_equal(&value.to_json(), d)) {
                continue;
            }

            let shaped = self.shape_value(&field.field_type, value, field_filter, directive)?;
            out.insert(field.name.clone(), shaped);
        }
        Ok(out)
    }

    fn shape_value(
        &self,
        field_type: &FieldType,
        value: &BoundValue,
        filter: Filter<'_>,
        directive: &ShapeDirective,
    ) -> ShapeResult<Value> {
        match (field_type, value) {
            (FieldType::Object { schema }, BoundValue::Object(object)) => {
                let nested = self.registry.get(schema)?;
                Ok(Value::Object(self.shape_object(nested, object, filter, directive)?))
            }
            (FieldType::Sequence { items } | FieldType::Set { items }, BoundValue::Seq(elements)) => elements
                .iter()
                .map(|element| self.shape_value(items, element, filter, directive))
                .collect::<ShapeResult<Vec<_>>>()
                .map(Value::Array),
            (FieldType::Mapping { values, .. }, BoundValue::Map(entries)) => {
                let mut out = Map::new();
                for (key, entry) in entries {
                    out.insert(key.clone(), self.shape_value(values, entry, filter, directive)?);
                }
                Ok(Value::Object(out))
            }
            _ => Ok(value.to_json()),
        }
    }
}

/// Element type reached through sequences, sets and mapping values.
fn element_type(field_type: &FieldType) -> &FieldType {
    match field_type {
        FieldType::Sequence { items } | FieldType::Set { items } => element_type(items),
        FieldType::Mapping { values, .. } => element_type(values),
        other => other,
    }
}

fn prefixed(index: usize, error: &FieldError) -> FieldError {
    let path = if error.path.is_empty() {
        format!("[{}]", index)
    } else {
        format!("[{}].{}", index, error.path)
    };
    FieldError {
        path,
        ..error.clone()
    }
}

/// JSON equality where numbers compare by value (`0` equals `0.0`).
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| loosely_equal(x, y)))
        }
        _ => a == b,
    }
}
