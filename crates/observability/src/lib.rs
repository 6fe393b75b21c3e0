//! Process-wide tracing setup shared by the scoreline binaries.

/// Tracing subscriber configuration.
pub mod tracing;

pub use crate::tracing::{init, init_with_default, DEFAULT_FILTER};
