//! Tracing/logging setup shared by binaries and tests that use the messaging API.

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&config::TracingConfig::from_env());
}

/// Logging configuration (filter directives, output format).
pub mod config;

/// Subscriber installation.
pub mod tracing;

pub use config::{LogFormat, TracingConfig};
