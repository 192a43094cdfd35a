//! modelgate - declarative request binding and response shaping
//!
//! Three components, all driven by data-only schemas:
//!
//! - [`schema`]: the registry of named message schemas
//! - [`binding`]: untyped path/query/header/body inputs to typed values
//! - [`shaping`]: typed values to filtered JSON responses
//!
//! The registry is built once at startup and then shared read-only.

pub mod api;
pub mod binding;
pub mod catalog;
pub mod cli;
pub mod observability;
pub mod schema;
pub mod shaping;
