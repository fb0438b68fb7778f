//! In-memory logger for inspecting what a component reported.

use crate::log::{LogLevel, Logger};
use parking_lot::Mutex;
use std::fmt::Arguments;

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that stores every formatted message.
///
/// ```
/// use hydra::log::{CaptureLogger, LogLevel, Logger};
///
/// let logger = CaptureLogger::new();
/// logger.warn(format_args!("partition {} unavailable", "btcusdt"));
///
/// assert_eq!(logger.count_at(LogLevel::Warn), 1);
/// assert!(logger.contains("btcusdt"));
/// ```
#[derive(Debug, Default)]
pub struct CaptureLogger {
    lines: Mutex<Vec<CapturedLine>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything captured so far, oldest first.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().clone()
    }

    /// Number of captured lines at exactly `level`.
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.lines.lock().iter().filter(|l| l.level == level).count()
    }

    /// Whether any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Logger for CaptureLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.lines.lock().push(CapturedLine {
            level,
            message: args.to_string(),
        });
    }
}
