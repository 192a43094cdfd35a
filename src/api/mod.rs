//! HTTP boundary for modelgate
//!
//! Framework adapters: building [`RawInputs`](crate::binding::RawInputs)
//! from request parts and turning failures into axum responses. No routing
//! or server wiring lives here.

mod errors;
mod extract;

pub use errors::{ApiError, ApiResult};
pub use extract::raw_inputs;
