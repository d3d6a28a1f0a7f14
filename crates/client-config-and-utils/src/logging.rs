//! Logging initialization for the client.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system for the client.
///
/// Sets up tracing with:
/// - Structured output to stderr
/// - Log level from the RUST_LOG env var or the provided default
///
/// Safe to call more than once; subsequent calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error)
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(level).to_string().to_lowercase()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
