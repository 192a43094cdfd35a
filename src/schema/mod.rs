//! Schema subsystem for modelgate
//!
//! Schemas are declarative, data-only descriptions of structured messages.
//! They are built with [`SchemaSpec::builder`] or loaded from JSON files,
//! registered once at startup and never mutated afterwards.
//!
//! # Design Principles
//!
//! - Explicit field lists, no reflection
//! - A field with a default is never required
//! - One schema per name
//! - Nested schemas are referenced by name and resolved through the registry

mod errors;
mod json_schema;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use json_schema::to_json_schema;
pub use registry::SchemaRegistry;
pub use types::{
    Constraints, ExtraPolicy, FieldSpec, FieldType, ParamSource, Pattern, SchemaBuilder, SchemaSpec,
};
