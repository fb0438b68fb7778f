//! Integration tests for the DataManager over the store contract.
//!
//! These tests exercise the manager end to end:
//! - Realtime queue bounds and error recording
//! - Windowed historical fetch (query shape, ordering, pacing, cancellation)
//! - Retention cleanup across partitions
//! - Archiving under concurrent writes
//! - Cache clearing
//!
//! Run with: `cargo test --test data_manager_integration`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use hydra::data::{DataError, DataManager, HistoricalQuery, NoDelay, Throttle};
use hydra::log::{CaptureLogger, LogLevel, NoOpLogger};
use hydra::store::{
    Cursor, DocumentId, DocumentStore, Filter, FindOptions, MemoryStore, MetricDocument, Metrics,
    Partition, StoreError,
};
use hydra::system::{HardwareProfile, SystemConfig};

// ============================================================================
// Test Helpers
// ============================================================================

fn laptop_config() -> Arc<SystemConfig> {
    Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()))
}

fn connected_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new("hydra_test"));
    store.connect().unwrap();
    store
}

fn manager_over(store: Arc<dyn DocumentStore>) -> DataManager {
    DataManager::new_with_logger(store, laptop_config(), Arc::new(NoOpLogger))
        .with_throttle(Arc::new(NoDelay))
}

fn price(value: f64) -> Metrics {
    let mut metrics = Metrics::new();
    metrics.insert("price".to_string(), value);
    metrics
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn insert_at(store: &MemoryStore, symbol: &str, ts: DateTime<Utc>, value: f64) {
    store
        .partition(&symbol.to_lowercase())
        .unwrap()
        .insert_one(MetricDocument::at(symbol, price(value), ts))
        .unwrap();
}

/// Store wrapper that records every `find` issued against it.
struct RecordingStore {
    inner: Arc<MemoryStore>,
    finds: Arc<Mutex<Vec<(Filter, FindOptions)>>>,
}

impl RecordingStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            finds: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn finds(&self) -> Vec<Filter> {
        self.finds.lock().unwrap().iter().map(|(f, _)| f.clone()).collect()
    }

    fn batch_hints(&self) -> Vec<Option<usize>> {
        self.finds.lock().unwrap().iter().map(|(_, o)| o.batch_size).collect()
    }
}

struct RecordingPartition {
    inner: Arc<dyn Partition>,
    finds: Arc<Mutex<Vec<(Filter, FindOptions)>>>,
}

impl DocumentStore for RecordingStore {
    fn connect(&self) -> Result<(), StoreError> {
        self.inner.connect()
    }

    fn partition(&self, name: &str) -> Result<Arc<dyn Partition>, StoreError> {
        Ok(Arc::new(RecordingPartition {
            inner: self.inner.partition(name)?,
            finds: self.finds.clone(),
        }))
    }

    fn list_partition_names(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_partition_names()
    }

    fn close(&self) {
        self.inner.close()
    }
}

impl Partition for RecordingPartition {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn insert_one(&self, document: MetricDocument) -> Result<DocumentId, StoreError> {
        self.inner.insert_one(document)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor<'_>, StoreError> {
        self.finds.lock().unwrap().push((filter.clone(), *options));
        self.inner.find(filter, options)
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.delete_many(filter)
    }

    fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.count_documents(filter)
    }
}

/// Store whose partitions reject every insert.
struct RejectingStore;

struct RejectingPartition;

impl DocumentStore for RejectingStore {
    fn connect(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn partition(&self, _name: &str) -> Result<Arc<dyn Partition>, StoreError> {
        Ok(Arc::new(RejectingPartition))
    }

    fn list_partition_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn close(&self) {}
}

impl Partition for RejectingPartition {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn insert_one(&self, _document: MetricDocument) -> Result<DocumentId, StoreError> {
        Err(StoreError::operation("insert_one", "write concern failed"))
    }

    fn find(&self, _filter: &Filter, _options: &FindOptions) -> Result<Cursor<'_>, StoreError> {
        Ok(Box::new(std::iter::empty()))
    }

    fn delete_many(&self, _filter: &Filter) -> Result<u64, StoreError> {
        Ok(0)
    }

    fn count_documents(&self, _filter: &Filter) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// Store whose first source-partition `find` is followed by a concurrent
/// write, as if another thread saved a metric mid-operation.
struct InterleavingStore {
    inner: Arc<MemoryStore>,
    written: Arc<AtomicBool>,
}

struct InterleavingPartition {
    inner: Arc<dyn Partition>,
    written: Arc<AtomicBool>,
}

impl DocumentStore for InterleavingStore {
    fn connect(&self) -> Result<(), StoreError> {
        self.inner.connect()
    }

    fn partition(&self, name: &str) -> Result<Arc<dyn Partition>, StoreError> {
        Ok(Arc::new(InterleavingPartition {
            inner: self.inner.partition(name)?,
            written: self.written.clone(),
        }))
    }

    fn list_partition_names(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_partition_names()
    }

    fn close(&self) {
        self.inner.close()
    }
}

impl Partition for InterleavingPartition {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn insert_one(&self, document: MetricDocument) -> Result<DocumentId, StoreError> {
        self.inner.insert_one(document)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor<'_>, StoreError> {
        let cursor = self.inner.find(filter, options)?;
        if !self.inner.name().ends_with("_archive") && !self.written.swap(true, Ordering::SeqCst)
        {
            self.inner
                .insert_one(MetricDocument::at("BTCUSDT", price(99.0), day(9)))?;
        }
        Ok(cursor)
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.delete_many(filter)
    }

    fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.count_documents(filter)
    }
}

/// Throttle that counts how often it was asked to wait.
#[derive(Default)]
struct CountingThrottle {
    waits: AtomicUsize,
}

impl Throttle for CountingThrottle {
    fn wait(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Throttle that cancels a token the first time it is asked to wait.
struct CancellingThrottle {
    token: CancellationToken,
}

impl Throttle for CancellingThrottle {
    fn wait(&self) {
        self.token.cancel();
    }
}

// ============================================================================
// Realtime queues
// ============================================================================

#[test]
fn test_metrics_queue_keeps_newest_1000() {
    let manager = manager_over(connected_store());

    for i in 1..=1005 {
        assert!(manager.save_metrics(&price(i as f64), "BTCUSDT"));
    }

    let queue = manager.get_realtime_queue("metrics");
    let prices: Vec<f64> = queue
        .iter()
        .map(|entry| entry.as_metric().unwrap().metrics["price"])
        .collect();

    assert_eq!(prices.len(), 1000);
    assert_eq!(prices[0], 6.0);
    assert_eq!(prices[999], 1005.0);
    assert!(prices.windows(2).all(|w| w[1] == w[0] + 1.0));
}

#[test]
fn test_failed_insert_records_one_error() {
    let logger = Arc::new(CaptureLogger::new());
    let manager = DataManager::new(Arc::new(RejectingStore), laptop_config())
        .with_logger(logger.clone())
        .with_throttle(Arc::new(NoDelay));

    assert!(!manager.save_metrics(&price(50_000.0), "BTCUSDT"));

    let errors = manager.get_realtime_queue("errors");
    assert_eq!(errors.len(), 1);
    let entry = errors[0].as_error().unwrap();
    assert_eq!(entry.operation, "save_metrics");
    assert!(entry.error.contains("write concern failed"));

    assert!(manager.get_realtime_queue("metrics").is_empty());
    assert_eq!(logger.count_at(LogLevel::Error), 1);
}

#[test]
fn test_errors_queue_is_bounded() {
    let manager = DataManager::new(Arc::new(RejectingStore), laptop_config())
        .with_logger(Arc::new(NoOpLogger));

    for _ in 0..150 {
        manager.save_metrics(&price(1.0), "BTCUSDT");
    }

    assert_eq!(manager.get_realtime_queue("errors").len(), 100);
}

// ============================================================================
// Historical fetch
// ============================================================================

#[test]
fn test_two_day_range_issues_two_window_queries() {
    let memory = connected_store();
    insert_at(&memory, "BTCUSDT", day(2) + Duration::hours(3), 2.0);
    insert_at(&memory, "BTCUSDT", day(1) + Duration::hours(3), 1.0);

    let store = Arc::new(RecordingStore::new(memory));
    let manager = manager_over(store.clone());

    let frame = manager.get_historical_data("BTCUSDT", day(1), day(3), None);

    let finds = store.finds();
    assert_eq!(finds.len(), 2);
    assert_eq!(finds[0].timestamp_gte, Some(day(1)));
    assert_eq!(finds[0].timestamp_lt, Some(day(2)));
    assert_eq!(finds[1].timestamp_gte, Some(day(2)));
    assert_eq!(finds[1].timestamp_lt, Some(day(3)));
    assert!(finds.iter().all(|f| f.symbol.as_deref() == Some("BTCUSDT")));

    assert_eq!(frame.column("price"), Some(vec![Some(1.0), Some(2.0)]));
}

#[test]
fn test_batch_size_reaches_store_as_hint() {
    let store = Arc::new(RecordingStore::new(connected_store()));
    let manager = manager_over(store.clone());
    let default = laptop_config().resources.batch_sizes.historical;

    manager.get_historical_data("BTCUSDT", day(1), day(3), None);
    manager.get_historical_data("BTCUSDT", day(1), day(3), Some(7));

    assert_eq!(
        store.batch_hints(),
        vec![Some(default), Some(default), Some(7), Some(7)]
    );
}

#[test]
fn test_empty_range_issues_no_queries() {
    let store = Arc::new(RecordingStore::new(connected_store()));
    let manager = manager_over(store.clone());

    let frame = manager.get_historical_data("BTCUSDT", day(3), day(3), None);

    assert!(frame.is_empty());
    assert!(store.finds().is_empty());
}

#[test]
fn test_throttle_runs_between_windows_only() {
    let throttle = Arc::new(CountingThrottle::default());
    let manager = DataManager::new(connected_store(), laptop_config())
        .with_logger(Arc::new(NoOpLogger))
        .with_throttle(throttle.clone());

    manager.get_historical_data("BTCUSDT", day(1), day(6), None);

    assert_eq!(throttle.waits.load(Ordering::SeqCst), 4);
}

#[test]
fn test_cancellation_stops_between_windows() {
    let token = CancellationToken::new();
    let store = Arc::new(RecordingStore::new(connected_store()));
    let manager = DataManager::new(store.clone(), laptop_config())
        .with_logger(Arc::new(NoOpLogger))
        .with_throttle(Arc::new(CancellingThrottle {
            token: token.clone(),
        }));

    let query = HistoricalQuery::new("BTCUSDT", day(1), day(5));
    let result = manager.try_get_historical_data(&query, &token);

    assert!(matches!(
        result,
        Err(DataError::Cancelled {
            windows_completed: 1
        })
    ));
    assert_eq!(store.finds().len(), 1);
}

#[test]
fn test_historical_failure_is_soft() {
    let store = connected_store();
    let manager = manager_over(store.clone());
    store.set_online(false);

    let frame = manager.get_historical_data("BTCUSDT", day(1), day(3), Some(500));

    assert!(frame.is_empty());
    let errors = manager.get_realtime_queue("errors");
    assert_eq!(errors[0].as_error().unwrap().operation, "get_historical_data");
}

// ============================================================================
// Retention
// ============================================================================

#[test]
fn test_cleanup_counts_across_partitions() {
    let store = connected_store();
    let old = Utc::now() - Duration::days(40);
    let recent = Utc::now() - Duration::days(1);

    for i in 0..5 {
        insert_at(&store, "BTCUSDT", old + Duration::minutes(i), 1.0);
    }
    for i in 0..2 {
        insert_at(&store, "BTCUSDT", recent + Duration::minutes(i), 2.0);
    }
    for i in 0..2 {
        insert_at(&store, "ETHUSDT", old + Duration::minutes(i), 3.0);
    }

    let manager = manager_over(store.clone());

    assert_eq!(manager.cleanup_old_data(30), 7);

    let survivors = manager.get_latest_metrics("BTCUSDT", 10);
    assert_eq!(survivors.len(), 2);
    assert!(survivors.iter().all(|r| r.timestamp >= recent));
    assert!(manager.get_latest_metrics("ETHUSDT", 10).is_empty());
}

#[test]
fn test_cleanup_with_nothing_old() {
    let store = connected_store();
    insert_at(&store, "BTCUSDT", Utc::now(), 1.0);
    let manager = manager_over(store);

    assert_eq!(manager.cleanup_old_data(30), 0);
    assert!(manager.get_realtime_queue("errors").is_empty());
}

// ============================================================================
// Archiving
// ============================================================================

#[test]
fn test_archive_keeps_documents_written_mid_archive() {
    let memory = connected_store();
    for d in 1..=3 {
        insert_at(&memory, "BTCUSDT", day(d), f64::from(d));
    }
    let store = Arc::new(InterleavingStore {
        inner: memory.clone(),
        written: Arc::new(AtomicBool::new(false)),
    });
    let manager = manager_over(store);

    let report = manager.archive_partition("BTCUSDT").unwrap();

    assert_eq!(report.archived, 3);
    assert_eq!(report.removed, 3);
    let source = memory.partition("btcusdt").unwrap();
    let archive = memory.partition("btcusdt_archive").unwrap();
    assert_eq!(archive.count_documents(&Filter::all()).unwrap(), 3);
    let left: Vec<_> = source
        .find(&Filter::all(), &FindOptions::default())
        .unwrap()
        .map(|doc| doc.unwrap().document.timestamp)
        .collect();
    assert_eq!(left, vec![day(9)]);
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_clear_cache_twice() {
    let manager = manager_over(connected_store());
    manager.cache_put("latest:btcusdt", vec![7u8; 4096]).unwrap();
    assert_eq!(manager.cache_size_bytes(), 4096);

    manager.clear_cache();
    manager.clear_cache();

    assert_eq!(manager.cache_size_bytes(), 0);
    assert_eq!(manager.cache_stats().entry_count, 0);
}

#[test]
fn test_manager_shared_across_threads() {
    let manager = Arc::new(manager_over(connected_store()));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    manager.save_metrics(&price((t * 100 + i) as f64), "BTCUSDT");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.get_realtime_queue("metrics").len(), 200);
    assert_eq!(manager.get_latest_metrics("BTCUSDT", 1000).len(), 200);
}
