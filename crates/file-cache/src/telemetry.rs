//! Logging setup for binaries that embed the cache
//!
//! The library itself only emits `tracing` events; whoever owns `main`
//! decides whether to install a subscriber.

use crate::error::{CacheError, Result};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install a global tracing subscriber.
///
/// `RUST_LOG` is honoured and `default_directive` (e.g. `"file_cache=info"`)
/// is added on top. With `LOG_FORMAT=json` events are written in the GCP
/// Cloud Logging format.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive(default_directive.parse()?);

    if json_logging_requested() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .try_init()
            .map_err(|e| CacheError::Config(format!("Failed to install subscriber: {}", e)))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .map_err(|e| CacheError::Config(format!("Failed to install subscriber: {}", e)))
    }
}

fn json_logging_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
}
