//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional JSON formatting and daily rolling file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless:
/// the second `try_init` is ignored.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_dir = log_dir.map(Path::new).filter(|p| p.exists());

    let result = match (json.unwrap_or(false), file_dir.and_then(|p| p.to_str())) {
        (true, Some(dir)) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "pos-server"))
            .try_init(),
        (false, Some(dir)) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "pos-server"))
            .try_init(),
        (true, None) => builder.json().try_init(),
        (false, None) => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}

/// Initialize a quiet logger for tests
#[cfg(test)]
pub fn init_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_test_writer()
        .try_init();
}
