//! Tracing/logging setup shared by the engine binaries.

/// Logging configuration.
pub mod config;

/// Subscriber installation.
pub mod tracing;

pub use config::{LogFormat, LoggingConfig};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init(config: &LoggingConfig) {
    tracing::init(config);
}
