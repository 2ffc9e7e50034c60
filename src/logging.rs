//! Logging utilities for vector-filter
//!
//! Re-exports tracing macros with log_* naming convention so converters,
//! configuration and error constructors log the same way.

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    trace as log_trace,
    warn as log_warn,
};
