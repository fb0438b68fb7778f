//! Logger that drops every message.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Discards all messages. Default for components built without a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}
