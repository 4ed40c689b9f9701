//! kgbridge observability
//!
//! Structured logging setup, trace id propagation and HTTP request logging
//! shared by the kgbridge services.

pub mod init;
pub mod middleware;
pub mod trace_context;

pub use init::*;
pub use middleware::*;
pub use trace_context::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, trace, warn, Instrument, Level};
