//! Request binding
//!
//! Turns untyped path, query, header and body inputs into typed
//! [`BoundObject`]s according to a registered schema, or reports every
//! field-level failure in one batch.

mod binder;
mod coerce;
mod errors;
mod inputs;
mod value;

pub use binder::RequestBinder;
pub use errors::{BindError, BindResult, ErrorKind, FieldError, ValidationError};
pub use inputs::RawInputs;
pub use value::{BoundObject, BoundValue};
