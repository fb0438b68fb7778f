//! Tabular result of a historical fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::{Metrics, StoredDocument};

/// One row: a document flattened to timestamp, symbol and metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRow {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub metrics: Metrics,
}

impl From<StoredDocument> for FrameRow {
    fn from(stored: StoredDocument) -> Self {
        Self {
            timestamp: stored.document.timestamp,
            symbol: stored.document.symbol,
            metrics: stored.document.metrics,
        }
    }
}

/// Rows in fetch order plus the union of metric columns.
///
/// Columns are `timestamp`, `symbol`, then metric names in first-seen order.
/// A row lacking a metric reads as `None` in that column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalFrame {
    rows: Vec<FrameRow>,
    metric_columns: Vec<String>,
}

impl HistoricalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: FrameRow) {
        for name in row.metrics.keys() {
            if !self.metric_columns.iter().any(|c| c == name) {
                self.metric_columns.push(name.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec!["timestamp", "symbol"];
        columns.extend(self.metric_columns.iter().map(String::as_str));
        columns
    }

    /// Per-row values of a metric column; `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if !self.metric_columns.iter().any(|c| c == name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.metrics.get(name).copied())
                .collect(),
        )
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|row| row.timestamp).collect()
    }
}

impl Extend<FrameRow> for HistoricalFrame {
    fn extend<I: IntoIterator<Item = FrameRow>>(&mut self, iter: I) {
        for row in iter {
            self.push(row);
        }
    }
}

impl FromIterator<FrameRow> for HistoricalFrame {
    fn from_iter<I: IntoIterator<Item = FrameRow>>(iter: I) -> Self {
        let mut frame = Self::new();
        frame.extend(iter);
        frame
    }
}
