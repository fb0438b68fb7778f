//! Persisted document shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named numeric metrics, e.g. `price`, `volume`, `rsi`.
pub type Metrics = BTreeMap<String, f64>;

/// One metrics observation for a symbol, as stored in its partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDocument {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub metrics: Metrics,
    /// Whether a downstream consumer has handled this document.
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl MetricDocument {
    /// Unprocessed document stamped with the current UTC time.
    pub fn new(symbol: impl Into<String>, metrics: Metrics) -> Self {
        Self::at(symbol, metrics, Utc::now())
    }

    /// Unprocessed document with an explicit observation time.
    pub fn at(symbol: impl Into<String>, metrics: Metrics, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            metrics,
            processed: false,
            created_at: timestamp,
        }
    }
}

/// Store-assigned document identifier, rendered as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document together with the id the store gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    #[serde(flatten)]
    pub document: MetricDocument,
}
