//! Logging setup for the backend.
//!
//! Structured logging via `tracing`, with noisy HTTP-stack modules capped at
//! `warn` so request-level business logs stay readable.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Modules that produce high-volume debug/trace logs without business value
/// (connection pools, TLS handshakes, HTTP framing).
pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "tower_http"];

/// Build the default filter, allowing `RUST_LOG` to override everything.
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }

    EnvFilter::new(&directives)
}

/// Initialize logging with the given level and format ("json" or "pretty").
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(log_level: &str, log_format: &str) {
    let filter = build_filter(log_level);
    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        "Logging initialized"
    );
}
