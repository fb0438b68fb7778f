//! Adapter from [`Logger`] to the `tracing` ecosystem.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Forwards every message to the matching `tracing` macro under the
/// `hydra` target, so `RUST_LOG=hydra=debug` filters library output.
///
/// Output only appears once a subscriber is installed, normally through
/// [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "hydra", "{}", args),
            LogLevel::Debug => tracing::debug!(target: "hydra", "{}", args),
            LogLevel::Info => tracing::info!(target: "hydra", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "hydra", "{}", args),
            LogLevel::Error => tracing::error!(target: "hydra", "{}", args),
        }
    }
}
