//! Bounded in-memory queues for recent events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::store::{DocumentId, Metrics};

/// FIFO that drops its oldest item once full.
///
/// ```
/// use hydra::data::RealtimeQueue;
///
/// let mut queue = RealtimeQueue::new(2);
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.push(3), Some(1));
/// assert_eq!(queue.snapshot(), vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct RealtimeQueue<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T: Clone> RealtimeQueue<T> {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `item`, returning the evicted oldest item if the queue was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Copy of the contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// The three realtime queues a data manager keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueName {
    Metrics,
    Signals,
    Errors,
}

impl QueueName {
    pub const ALL: [QueueName; 3] = [QueueName::Metrics, QueueName::Signals, QueueName::Errors];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Metrics => "metrics",
            QueueName::Signals => "signals",
            QueueName::Errors => "errors",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metrics" => Ok(QueueName::Metrics),
            "signals" => Ok(QueueName::Signals),
            "errors" => Ok(QueueName::Errors),
            other => Err(format!("unknown realtime queue '{}'", other)),
        }
    }
}

/// A metrics document that was just persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub id: DocumentId,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub metrics: Metrics,
}

/// A trading signal emitted by a downstream strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEntry {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    /// Signal label, e.g. `buy` or `sell`.
    pub signal: String,
    pub confidence: f64,
}

impl SignalEntry {
    pub fn new(symbol: impl Into<String>, signal: impl Into<String>, confidence: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            symbol: symbol.into(),
            signal: signal.into(),
            confidence,
        }
    }
}

/// A failed operation, kept for operators to inspect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub error: String,
    /// Name of the failing operation, e.g. `save_metrics`.
    pub operation: String,
}

impl ErrorEntry {
    pub fn new(operation: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            timestamp: Utc::now(),
            error: error.to_string(),
            operation: operation.into(),
        }
    }
}

/// Anything that can sit in a realtime queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RealtimeEntry {
    Metric(MetricSnapshot),
    Signal(SignalEntry),
    Error(ErrorEntry),
}

impl RealtimeEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RealtimeEntry::Metric(m) => m.timestamp,
            RealtimeEntry::Signal(s) => s.timestamp,
            RealtimeEntry::Error(e) => e.timestamp,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorEntry> {
        match self {
            RealtimeEntry::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_metric(&self) -> Option<&MetricSnapshot> {
        match self {
            RealtimeEntry::Metric(m) => Some(m),
            _ => None,
        }
    }
}
