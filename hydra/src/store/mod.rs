//! Document persistence.
//!
//! Symbols map to partitions (one per lower-cased symbol). The
//! [`DocumentStore`] and [`Partition`] traits are the only way the rest of
//! the crate touches storage; [`MemoryStore`] implements them in-process.

mod document;
mod memory;
mod r#trait;

pub use document::{DocumentId, MetricDocument, Metrics, StoredDocument};
pub use memory::MemoryStore;
pub use r#trait::{Cursor, DocumentStore, Filter, FindOptions, Partition, SortOrder, StoreError};
