//! Observability for modelgate
//!
//! Events are emitted with `tracing` at the component seams: schema
//! definition, bind outcomes and shaping. This module only wires the
//! subscriber.

mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
