//! Document store contract.
//!
//! The data layer only ever talks to these traits. A deployment backs them
//! with a real database driver; tests and local runs use
//! [`MemoryStore`](super::MemoryStore).

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use super::document::{DocumentId, MetricDocument, StoredDocument};

/// Errors raised by a store or one of its partitions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, or was never connected.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A specific operation was rejected.
    #[error("{operation} failed: {message}")]
    Operation { operation: String, message: String },
}

impl StoreError {
    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Lazily evaluated query results.
pub type Cursor<'a> = Box<dyn Iterator<Item = Result<StoredDocument, StoreError>> + Send + 'a>;

/// Document predicate: optional symbol match plus a half-open timestamp range,
/// optionally narrowed to a known set of document ids.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use hydra::store::Filter;
///
/// let day = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let filter = Filter::for_symbol("BTCUSDT")
///     .since(day)
///     .before(day + chrono::Duration::hours(24));
///
/// assert_eq!(filter.symbol.as_deref(), Some("BTCUSDT"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub symbol: Option<String>,
    /// Inclusive lower bound.
    pub timestamp_gte: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub timestamp_lt: Option<DateTime<Utc>>,
    /// Only documents with one of these ids. Needs the stored form to check.
    pub ids: Option<BTreeSet<DocumentId>>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.timestamp_gte = Some(start);
        self
    }

    pub fn before(mut self, end: DateTime<Utc>) -> Self {
        self.timestamp_lt = Some(end);
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = DocumentId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    /// Full check against a stored document, including the id set.
    pub fn matches_stored(&self, stored: &StoredDocument) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&stored.id) {
                return false;
            }
        }
        self.matches(&stored.document)
    }

    /// Field-level check; ignores [`ids`](Self::ids).
    pub fn matches(&self, document: &MetricDocument) -> bool {
        if let Some(symbol) = &self.symbol {
            if &document.symbol != symbol {
                return false;
            }
        }
        if let Some(start) = self.timestamp_gte {
            if document.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.timestamp_lt {
            if document.timestamp >= end {
                return false;
            }
        }
        true
    }
}

/// Result ordering by document timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    TimestampAscending,
    TimestampDescending,
}

/// Query shaping for [`Partition::find`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// `None` leaves results in the store's natural order.
    pub sort: Option<SortOrder>,
    pub limit: Option<usize>,
    /// Transfer-size hint; does not change which documents are returned.
    pub batch_size: Option<usize>,
}

impl FindOptions {
    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// A handle to a connected document database.
pub trait DocumentStore: Send + Sync {
    fn connect(&self) -> Result<(), StoreError>;

    /// Handle to the named partition, created on first use.
    ///
    /// Fails with [`StoreError::Unavailable`] when the store isn't connected.
    fn partition(&self, name: &str) -> Result<Arc<dyn Partition>, StoreError>;

    fn list_partition_names(&self) -> Result<Vec<String>, StoreError>;

    fn close(&self);
}

/// A named collection of [`MetricDocument`]s.
pub trait Partition: Send + Sync {
    fn name(&self) -> &str;

    fn insert_one(&self, document: MetricDocument) -> Result<DocumentId, StoreError>;

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor<'_>, StoreError>;

    /// Delete every matching document, returning how many were removed.
    fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError>;

    fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError>;
}
