//! Schema registry
//!
//! - Populated once at startup, from code or from a directory of JSON files
//! - One schema per name; redefinition is rejected
//! - Read-only afterwards, shared behind an `Arc` without locks

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::types::SchemaSpec;

/// In-memory registry of named schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Schemas indexed by name
    schemas: HashMap<String, SchemaSpec>,
    /// Names in definition order
    order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// - `MG_INVALID_SCHEMA` if the schema fails its structural checks
    /// - `MG_DUPLICATE_SCHEMA` if the name is already taken
    pub fn define(&mut self, schema: SchemaSpec) -> SchemaResult<&SchemaSpec> {
        schema.validate_structure()?;

        if self.schemas.contains_key(&schema.name) {
            return Err(SchemaError::duplicate(&schema.name));
        }

        debug!(schema = %schema.name, fields = schema.fields.len(), "schema defined");

        let name = schema.name.clone();
        self.order.push(name.clone());
        Ok(self.schemas.entry(name).or_insert(schema))
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> SchemaResult<&SchemaSpec> {
        self.schemas.get(name).ok_or_else(|| SchemaError::not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schema names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Schemas in definition order.
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaSpec> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Verifies that every nested schema reference resolves.
    pub fn check_references(&self) -> SchemaResult<()> {
        for schema in self.schemas() {
            for field in &schema.fields {
                if let Some(target) = field.field_type.nested_schema() {
                    if !self.contains(target) {
                        return Err(SchemaError::invalid_schema(
                            &schema.name,
                            format!("field '{}' references unknown schema '{}'", field.name, target),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Loads every `*.json` file in `dir`, in file name order.
    ///
    /// Returns the number of schemas loaded.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_file(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_file(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        debug!(dir = %dir.display(), count = paths.len(), "schema directory loaded");
        Ok(paths.len())
    }

    /// Loads a single schema file.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<&SchemaSpec> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        let schema: SchemaSpec = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.define(schema)
    }

    /// Writes a schema to `<dir>/<name>.json`.
    ///
    /// Refuses to overwrite an existing file.
    pub fn save_schema(&self, name: &str, dir: &Path) -> SchemaResult<PathBuf> {
        let schema = self.get(name)?;
        let path = dir.join(format!("{}.json", schema.name));

        if path.exists() {
            return Err(SchemaError::duplicate(&schema.name));
        }

        fs::create_dir_all(dir).map_err(|e| {
            SchemaError::malformed_file(
                dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Failed to serialize schema: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Failed to write file: {}", e))
        })?;

        Ok(path)
    }
}
