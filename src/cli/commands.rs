//! CLI command implementations
//!
//! Every command builds the same registry: the demo catalog plus any
//! schemas found in the configured `schema_dir`.

use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::binding::{RawInputs, RequestBinder};
use crate::catalog::catalog_registry;
use crate::observability::init_logging;
use crate::schema::{to_json_schema, SchemaRegistry};
use crate::shaping::{ResponseShaper, ShapeDirective};

use super::args::{Cli, Command};
use super::config::AppConfig;
use super::errors::CliResult;
use super::io::{read_json_file, write_json};

/// Parse arguments, set up logging and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = AppConfig::resolve(cli.config.as_deref())?;
    init_logging(&config.logging);
    let registry = build_registry(&config)?;
    let output = run_command(&registry, cli.command)?;
    write_json(&output)
}

/// Catalog schemas plus the configured schema directory.
pub fn build_registry(config: &AppConfig) -> CliResult<SchemaRegistry> {
    let mut registry = catalog_registry()?;
    if let Some(dir) = &config.schema_dir {
        let loaded = registry.load_dir(dir)?;
        info!(dir = %dir.display(), loaded, "loaded schema files");
    }
    registry.check_references()?;
    Ok(registry)
}

/// Run the appropriate command and return its output document
pub fn run_command(registry: &SchemaRegistry, cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Schemas => Ok(schemas(registry)),
        Command::Export { name } => export(registry, &name),
        Command::Bind {
            name,
            body,
            query,
            header,
            path,
        } => bind(registry, &name, body.as_deref(), query, header, path),
        Command::Shape {
            name,
            input,
            include,
            exclude,
            exclude_unset,
            exclude_none,
            exclude_defaults,
        } => {
            let directive = ShapeDirective {
                include: include.into_iter().collect(),
                exclude: exclude.into_iter().collect(),
                exclude_unset,
                exclude_none,
                exclude_defaults,
            };
            shape(registry, &name, &input, &directive)
        }
    }
}

/// Names of every registered schema, in registration order
pub fn schemas(registry: &SchemaRegistry) -> Value {
    json!({ "schemas": registry.names().collect::<Vec<_>>() })
}

pub fn export(registry: &SchemaRegistry, name: &str) -> CliResult<Value> {
    Ok(to_json_schema(registry, name)?)
}

/// Binds the given inputs and prints the bound value with its
/// explicitly-set field names.
pub fn bind(
    registry: &SchemaRegistry,
    name: &str,
    body: Option<&Path>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    path: Vec<(String, String)>,
) -> CliResult<Value> {
    let mut inputs = RawInputs::new();
    for (key, value) in path {
        inputs = inputs.with_path(key, value);
    }
    for (key, value) in query {
        inputs = inputs.with_query(key, value);
    }
    for (key, value) in headers {
        inputs = inputs.with_header(key, value);
    }
    if let Some(body) = body {
        inputs = inputs.with_body(read_json_file(body)?);
    }

    let bound = RequestBinder::new(registry).bind(name, &inputs)?;
    debug!(schema = name, "bound from command line");
    Ok(json!({
        "value": bound.to_json(),
        "explicitly_set": bound.explicitly_set().collect::<Vec<_>>(),
    }))
}

pub fn shape(registry: &SchemaRegistry, name: &str, input: &Path, directive: &ShapeDirective) -> CliResult<Value> {
    let raw = read_json_file(input)?;
    Ok(ResponseShaper::new(registry).shape_raw(name, &raw, directive)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> SchemaRegistry {
        build_registry(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_schemas_lists_catalog() {
        let out = schemas(&registry());
        let names = out["schemas"].as_array().unwrap();
        assert!(names.contains(&json!("Item")));
        assert!(names.contains(&json!("ReadItemParams")));
    }

    #[test]
    fn test_bind_command() {
        let out = bind(
            &registry(),
            "ReadItemParams",
            None,
            vec![("q".into(), "fixedquery".into())],
            vec![],
            vec![("item_id".into(), "7".into())],
        )
        .unwrap();
        assert_eq!(out["value"], json!({"item_id": 7, "q": "fixedquery", "short": false}));
        assert_eq!(out["explicitly_set"], json!(["item_id", "q"]));
    }

    #[test]
    fn test_bind_command_reports_validation() {
        let err = bind(&registry(), "ReadItemParams", None, vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err.code(), "MG_VALIDATION_FAILED");
        assert_eq!(err.detail().unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_shape_command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("item.json");
        fs::write(&input, r#"{"name": "Foo", "price": 35.4}"#).unwrap();

        let directive = ShapeDirective::new().exclude_unset();
        let out = shape(&registry(), "Item", &input, &directive).unwrap();
        assert_eq!(out, json!({"name": "Foo", "price": 35.4}));
    }

    #[test]
    fn test_schema_dir_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Gadget.json"),
            r#"{"name": "Gadget", "fields": [{"name": "id", "type": "int"}]}"#,
        )
        .unwrap();

        let config = AppConfig {
            schema_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let registry = build_registry(&config).unwrap();
        assert!(registry.contains("Gadget"));
        assert!(export(&registry, "Gadget").is_ok());
    }
}
