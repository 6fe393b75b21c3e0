//! Tracing subscriber initialization.
//!
//! JSON lines on stdout, filtered by `RUST_LOG`. When `RUST_LOG` is unset or
//! unparsable the default directive applies.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` does not provide one. sqlx statement logging
/// is noisy at `info`, so it is raised to `warn`.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Install the global subscriber with [`DEFAULT_FILTER`].
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Like [`init`], with a caller-chosen fallback directive. Returns `false`
/// if a global subscriber was already installed.
pub fn init_with_default(default_directive: &str) -> bool {
    let filter = env_filter(default_directive);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init()
        .is_ok()
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
