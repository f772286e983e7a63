//! Tracing initialization.
//!
//! Centralizes subscriber setup so every binary logs the same way.

use crate::ColorWhen;
use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber.
///
/// - Respects `RUST_LOG` via `EnvFilter`, falling back to `info`.
/// - ANSI color on stderr controlled by `ColorWhen`.
///
/// Fails if a global subscriber was already installed.
pub fn init_tracing(color: ColorWhen) -> Result<()> {
    // ---
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(color.should_color_stderr())
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
