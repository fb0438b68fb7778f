//! In-process document store.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::document::{DocumentId, MetricDocument, StoredDocument};
use crate::config::StoreSettings;
use super::r#trait::{
    Cursor, DocumentStore, Filter, FindOptions, Partition, SortOrder, StoreError,
};

/// Connection state shared by a store and every partition handle it issued.
#[derive(Debug, Default)]
struct Link {
    connected: AtomicBool,
    offline: AtomicBool,
    next_id: AtomicU64,
}

impl Link {
    fn check(&self, operation: &str) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{}: server is offline",
                operation
            )));
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{}: not connected",
                operation
            )));
        }
        Ok(())
    }

    fn next_id(&self) -> DocumentId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        DocumentId::new(format!("{:024x}", n))
    }
}

/// Document store held entirely in memory.
///
/// Partitions keep insertion order, and sorting is stable, so documents with
/// equal timestamps come back in the order they were written. Useful for
/// tests and for running without a database.
///
/// ```
/// use hydra::store::{DocumentStore, Filter, MemoryStore, MetricDocument, Metrics};
///
/// let store = MemoryStore::new("hydra_metrics");
/// store.connect().unwrap();
///
/// let btc = store.partition("btcusdt").unwrap();
/// btc.insert_one(MetricDocument::new("BTCUSDT", Metrics::new())).unwrap();
///
/// assert_eq!(btc.count_documents(&Filter::all()).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    database: String,
    link: Arc<Link>,
    partitions: RwLock<BTreeMap<String, Arc<MemoryPartition>>>,
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            link: Arc::new(Link::default()),
            partitions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store named after `settings.database`.
    ///
    /// The URI, timeouts and pool sizes only matter to a networked driver
    /// and are not used here.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.database.clone())
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::SeqCst)
    }

    /// Simulate the server going away (`false`) or coming back (`true`).
    ///
    /// While offline every call, including those on previously issued
    /// partition handles, fails with [`StoreError::Unavailable`].
    pub fn set_online(&self, online: bool) {
        self.link.offline.store(!online, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    fn connect(&self) -> Result<(), StoreError> {
        if self.link.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "cannot reach database '{}'",
                self.database
            )));
        }
        self.link.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn partition(&self, name: &str) -> Result<Arc<dyn Partition>, StoreError> {
        self.link.check("partition")?;

        if let Some(existing) = self.partitions.read().get(name) {
            return Ok(existing.clone());
        }

        let mut partitions = self.partitions.write();
        let partition = partitions
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryPartition::new(name, self.link.clone())));
        Ok(partition.clone())
    }

    fn list_partition_names(&self) -> Result<Vec<String>, StoreError> {
        self.link.check("list_partition_names")?;
        Ok(self.partitions.read().keys().cloned().collect())
    }

    fn close(&self) {
        self.link.connected.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct MemoryPartition {
    name: String,
    link: Arc<Link>,
    documents: RwLock<Vec<StoredDocument>>,
}

impl MemoryPartition {
    fn new(name: &str, link: Arc<Link>) -> Self {
        Self {
            name: name.to_string(),
            link,
            documents: RwLock::new(Vec::new()),
        }
    }
}

impl Partition for MemoryPartition {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, document: MetricDocument) -> Result<DocumentId, StoreError> {
        self.link.check("insert_one")?;
        let id = self.link.next_id();
        self.documents.write().push(StoredDocument {
            id: id.clone(),
            document,
        });
        Ok(id)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor<'_>, StoreError> {
        self.link.check("find")?;

        let mut matched: Vec<StoredDocument> = self
            .documents
            .read()
            .iter()
            .filter(|stored| filter.matches_stored(stored))
            .cloned()
            .collect();

        match options.sort {
            Some(SortOrder::TimestampAscending) => {
                matched.sort_by_key(|stored| stored.document.timestamp)
            }
            Some(SortOrder::TimestampDescending) => {
                matched.sort_by(|a, b| b.document.timestamp.cmp(&a.document.timestamp))
            }
            None => {}
        }

        if let Some(limit) = options.limit {
            matched.truncate(limit);
        }

        Ok(Box::new(matched.into_iter().map(Ok::<_, StoreError>)))
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.link.check("delete_many")?;
        let mut documents = self.documents.write();
        let before = documents.len();
        documents.retain(|stored| !filter.matches_stored(stored));
        Ok((before - documents.len()) as u64)
    }

    fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.link.check("count_documents")?;
        let count = self
            .documents
            .read()
            .iter()
            .filter(|stored| filter.matches_stored(stored))
            .count();
        Ok(count as u64)
    }
}
