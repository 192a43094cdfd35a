//! Response shaping
//!
//! Filters and serializes outbound values against a declared response
//! schema. Shaping never mutates the value it is given.

mod directive;
mod errors;
mod shaper;

pub use directive::ShapeDirective;
pub use errors::{ShapeError, ShapeResult};
pub use shaper::ResponseShaper;
