//! Demo catalog
//!
//! The item/user/offer/invoice models of the demo API registered through
//! the schema builder, and the handler logic of its operations as plain
//! functions. Tests drive them through the full bind, handle and shape cycle.

pub mod handlers;
pub mod models;

pub use models::{catalog_registry, params, register_models, register_params};
