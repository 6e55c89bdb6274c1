//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Binaries and tests call
//! [`init_tracing`] once to print them.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber with the default `info` level.
///
/// `RUST_LOG` overrides the level when set. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing() {
    let _ = init_tracing_with(LogFormat::Pretty, "info");
}

/// Install the global subscriber with an explicit format and fallback level.
///
/// Returns `false` when a subscriber was already installed.
#[must_use]
pub fn init_tracing_with(format: LogFormat, level: &str) -> bool {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    result.is_ok()
}
