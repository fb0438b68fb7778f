//! Central access point for metric persistence and in-memory data.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::cache::{CacheError, CacheStats, DataCache};
use super::error::DataError;
use super::frame::HistoricalFrame;
use super::queue::{
    ErrorEntry, MetricSnapshot, QueueName, RealtimeEntry, RealtimeQueue, SignalEntry,
};
use super::throttle::{FixedDelay, Throttle};
use super::window::TimeWindows;
use crate::config::{
    ConfigFile, QueueSettings, DEFAULT_ARCHIVE_SUFFIX, DEFAULT_RETENTION_DAYS,
    DEFAULT_WINDOW_HOURS,
};
use crate::log::{Logger, TracingLogger};
use crate::store::{
    DocumentId, DocumentStore, Filter, FindOptions, MetricDocument, Metrics, Partition,
    SortOrder, StoreError, StoredDocument,
};
use crate::system::SystemConfig;
use crate::{log_debug, log_error, log_info, log_trace, log_warn};

/// A persisted metrics document as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub id: DocumentId,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub metrics: Metrics,
}

impl From<StoredDocument> for MetricRecord {
    fn from(stored: StoredDocument) -> Self {
        Self {
            id: stored.id,
            timestamp: stored.document.timestamp,
            symbol: stored.document.symbol,
            metrics: stored.document.metrics,
        }
    }
}

/// Parameters of a windowed historical fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub symbol: String,
    /// Inclusive.
    pub start: DateTime<Utc>,
    /// Exclusive.
    pub end: DateTime<Utc>,
    /// Page-size hint; `None` uses the configured or hardware-derived size.
    pub batch_size: Option<usize>,
}

impl HistoricalQuery {
    pub fn new(symbol: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
            batch_size: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// What a symbol's partition currently holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionSummary {
    pub partition: String,
    pub document_count: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    /// Metric names present on the newest document.
    pub latest_metric_keys: Vec<String>,
}

/// Outcome of moving a partition into its archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub source: String,
    pub archive: String,
    pub archived: u64,
    pub removed: u64,
}

struct RealtimeQueues {
    metrics: RealtimeQueue<RealtimeEntry>,
    signals: RealtimeQueue<RealtimeEntry>,
    errors: RealtimeQueue<RealtimeEntry>,
}

impl RealtimeQueues {
    fn new(settings: QueueSettings) -> Self {
        Self {
            metrics: RealtimeQueue::new(settings.metrics_capacity),
            signals: RealtimeQueue::new(settings.signals_capacity),
            errors: RealtimeQueue::new(settings.errors_capacity),
        }
    }

    fn get(&self, name: QueueName) -> &RealtimeQueue<RealtimeEntry> {
        match name {
            QueueName::Metrics => &self.metrics,
            QueueName::Signals => &self.signals,
            QueueName::Errors => &self.errors,
        }
    }
}

/// Persists per-symbol metrics and serves them back.
///
/// Every operation has two forms. `try_*` returns a [`DataError`] on
/// failure, so an empty result always means "nothing there". The plain form
/// never fails: it logs the error, records it on the `errors` queue, and
/// returns `false`, an empty collection, or `0`.
///
/// The manager is `Send + Sync`; share it with `Arc`.
///
/// ```
/// use hydra::data::DataManager;
/// use hydra::log::NoOpLogger;
/// use hydra::store::{DocumentStore, MemoryStore, Metrics};
/// use hydra::system::{HardwareProfile, SystemConfig};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new("hydra_metrics"));
/// store.connect().unwrap();
///
/// let config = Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()));
/// let manager = DataManager::new_with_logger(store, config, Arc::new(NoOpLogger));
///
/// let mut metrics = Metrics::new();
/// metrics.insert("price".to_string(), 50_000.0);
/// assert!(manager.save_metrics(&metrics, "BTCUSDT"));
/// assert_eq!(manager.get_latest_metrics("BTCUSDT", 5).len(), 1);
/// ```
pub struct DataManager {
    store: Arc<dyn DocumentStore>,
    config: Arc<SystemConfig>,
    logger: Arc<dyn Logger>,
    throttle: Arc<dyn Throttle>,
    window: Duration,
    historical_batch_size: Option<usize>,
    retention_days: u32,
    archive_suffix: String,
    cache: DataCache,
    queues: Mutex<RealtimeQueues>,
}

impl DataManager {
    /// Manager with default queue capacities, 24 h windows and a 100 ms
    /// inter-window pause. The cache is bounded by the hardware tier's
    /// data cache limit.
    pub fn new(store: Arc<dyn DocumentStore>, config: Arc<SystemConfig>) -> Self {
        Self::new_with_logger(store, config, Arc::new(TracingLogger))
    }

    /// Same as [`new`](Self::new), logging through `logger` from the start.
    pub fn new_with_logger(
        store: Arc<dyn DocumentStore>,
        config: Arc<SystemConfig>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let cache_limit_mb = config.resources.memory_limits.data_cache;
        let manager = Self {
            cache: DataCache::new(config.resources.memory_limits.data_cache_bytes()),
            store,
            config,
            logger,
            throttle: Arc::new(FixedDelay::default()),
            window: Duration::hours(i64::from(DEFAULT_WINDOW_HOURS)),
            historical_batch_size: None,
            retention_days: DEFAULT_RETENTION_DAYS,
            archive_suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
            queues: Mutex::new(RealtimeQueues::new(QueueSettings::default())),
        };
        log_info!(
            manager.logger,
            "DataManager initialized with cache limit: {}MB",
            cache_limit_mb
        );
        manager
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Apply fetch, queue and retention settings.
    ///
    /// Installs a [`FixedDelay`] throttle from `fetch.inter_window_delay_ms`;
    /// call [`with_throttle`](Self::with_throttle) afterwards to replace it.
    /// Queue contents are discarded.
    pub fn with_settings(mut self, settings: &ConfigFile) -> Self {
        self.window = settings.fetch.window();
        self.throttle = Arc::new(FixedDelay(settings.fetch.inter_window_delay()));
        self.historical_batch_size = settings.fetch.historical_batch_size;
        self.retention_days = settings.retention.older_than_days;
        self.archive_suffix = settings.retention.archive_suffix.clone();
        self.queues = Mutex::new(RealtimeQueues::new(settings.queues));
        self
    }

    pub fn system_config(&self) -> &SystemConfig {
        &self.config
    }

    /// Page-size hint used when a query doesn't set one.
    pub fn default_historical_batch_size(&self) -> usize {
        self.historical_batch_size
            .unwrap_or(self.config.resources.batch_sizes.historical)
    }

    fn partition_for(&self, symbol: &str) -> Result<Arc<dyn Partition>, StoreError> {
        self.store.partition(&symbol.to_lowercase())
    }

    fn record_error(&self, operation: &str, error: &DataError) {
        log_error!(self.logger, "{} failed: {}", operation, error);
        let entry = RealtimeEntry::Error(ErrorEntry::new(operation, error));
        self.queues.lock().errors.push(entry);
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist `metrics` for `symbol` and publish it on the `metrics` queue.
    pub fn try_save_metrics(
        &self,
        metrics: &Metrics,
        symbol: &str,
    ) -> Result<MetricRecord, DataError> {
        let partition = self.partition_for(symbol)?;
        let document = MetricDocument::new(symbol, metrics.clone());
        let timestamp = document.timestamp;

        let id = partition.insert_one(document)?;

        let snapshot = MetricSnapshot {
            id: id.clone(),
            timestamp,
            symbol: symbol.to_string(),
            metrics: metrics.clone(),
        };
        self.queues.lock().metrics.push(RealtimeEntry::Metric(snapshot));

        log_debug!(self.logger, "Metrics saved for {}", symbol);
        Ok(MetricRecord {
            id,
            timestamp,
            symbol: symbol.to_string(),
            metrics: metrics.clone(),
        })
    }

    /// Fail-soft [`try_save_metrics`](Self::try_save_metrics).
    pub fn save_metrics(&self, metrics: &Metrics, symbol: &str) -> bool {
        match self.try_save_metrics(metrics, symbol) {
            Ok(_) => true,
            Err(e) => {
                self.record_error("save_metrics", &e);
                false
            }
        }
    }

    /// Append a strategy signal to the `signals` queue.
    pub fn record_signal(&self, signal: SignalEntry) {
        log_trace!(self.logger, "Signal {} for {}", signal.signal, signal.symbol);
        self.queues.lock().signals.push(RealtimeEntry::Signal(signal));
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Up to `limit` most recent documents for `symbol`, newest first.
    ///
    /// Documents with equal timestamps come back in the store's natural order.
    pub fn try_get_latest_metrics(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, DataError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let partition = self.partition_for(symbol)?;
        let options = FindOptions::default()
            .sorted(SortOrder::TimestampDescending)
            .limit(limit);

        let records = partition
            .find(&Filter::for_symbol(symbol), &options)?
            .map(|doc| doc.map(MetricRecord::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Fail-soft [`try_get_latest_metrics`](Self::try_get_latest_metrics).
    pub fn get_latest_metrics(&self, symbol: &str, limit: usize) -> Vec<MetricRecord> {
        self.try_get_latest_metrics(symbol, limit)
            .unwrap_or_else(|e| {
                self.record_error("get_latest_metrics", &e);
                Vec::new()
            })
    }

    /// Fetch `[start, end)` one window at a time.
    ///
    /// Each window is a single range query, drained completely before the
    /// next one starts. The throttle runs between windows and `cancel` is
    /// checked before each one. Rows come back in window order.
    pub fn try_get_historical_data(
        &self,
        query: &HistoricalQuery,
        cancel: &CancellationToken,
    ) -> Result<HistoricalFrame, DataError> {
        let batch_size = query
            .batch_size
            .unwrap_or_else(|| self.default_historical_batch_size());
        if batch_size == 0 {
            return Err(DataError::InvalidConfiguration(
                "historical batch size must be at least 1".to_string(),
            ));
        }
        if self.window <= Duration::zero() {
            return Err(DataError::InvalidConfiguration(format!(
                "historical window must be positive, got {}",
                self.window
            )));
        }

        let mut frame = HistoricalFrame::new();
        if query.start >= query.end {
            return Ok(frame);
        }

        let partition = self.partition_for(&query.symbol)?;
        let windows = TimeWindows::new(query.start, query.end, self.window);
        let total_windows = windows.remaining();
        let options = FindOptions::default().batch_size(batch_size);

        for (index, (window_start, window_end)) in windows.enumerate() {
            if index > 0 {
                self.throttle.wait();
            }
            if cancel.is_cancelled() {
                log_warn!(
                    self.logger,
                    "Historical fetch for {} cancelled after {} of {} windows",
                    query.symbol,
                    index,
                    total_windows
                );
                return Err(DataError::Cancelled {
                    windows_completed: index,
                });
            }

            let filter = Filter::for_symbol(query.symbol.as_str())
                .since(window_start)
                .before(window_end);
            let before = frame.len();
            for document in partition.find(&filter, &options)? {
                frame.push(document?.into());
            }

            log_trace!(
                self.logger,
                "Window {}/{} for {}: {} records",
                index + 1,
                total_windows,
                query.symbol,
                frame.len() - before
            );
        }

        log_info!(
            self.logger,
            "Loaded {} historical records for {}",
            frame.len(),
            query.symbol
        );
        Ok(frame)
    }

    /// Fail-soft, uncancellable [`try_get_historical_data`](Self::try_get_historical_data).
    pub fn get_historical_data(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        batch_size: Option<usize>,
    ) -> HistoricalFrame {
        let query = HistoricalQuery {
            symbol: symbol.to_string(),
            start,
            end,
            batch_size,
        };
        self.try_get_historical_data(&query, &CancellationToken::new())
            .unwrap_or_else(|e| {
                self.record_error("get_historical_data", &e);
                HistoricalFrame::new()
            })
    }

    // =========================================================================
    // Retention
    // =========================================================================

    /// Delete documents with a timestamp before `cutoff` from every partition.
    ///
    /// Stops at the first failing partition; deletions already made stay made.
    pub fn try_cleanup_old_data_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DataError> {
        let filter = Filter::all().before(cutoff);
        let mut deleted = 0;

        for name in self.store.list_partition_names()? {
            let removed = self.store.partition(&name)?.delete_many(&filter)?;
            if removed > 0 {
                log_debug!(self.logger, "Removed {} documents from {}", removed, name);
            }
            deleted += removed;
        }

        log_info!(self.logger, "Cleaned up {} old documents", deleted);
        Ok(deleted)
    }

    /// Fail-soft cleanup of documents older than `older_than_days`.
    pub fn cleanup_old_data(&self, older_than_days: u32) -> u64 {
        let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
        self.try_cleanup_old_data_before(cutoff)
            .unwrap_or_else(|e| {
                self.record_error("cleanup_old_data", &e);
                0
            })
    }

    /// [`cleanup_old_data`](Self::cleanup_old_data) with the configured retention.
    pub fn cleanup_expired_data(&self) -> u64 {
        self.cleanup_old_data(self.retention_days)
    }

    /// Counts and time span of a symbol's partition.
    pub fn describe_partition(&self, symbol: &str) -> Result<PartitionSummary, DataError> {
        let partition = self.partition_for(symbol)?;
        let document_count = partition.count_documents(&Filter::all())?;

        let edge = |order: SortOrder| -> Result<Option<StoredDocument>, DataError> {
            let options = FindOptions::default().sorted(order).limit(1);
            match partition.find(&Filter::all(), &options)?.next() {
                Some(doc) => Ok(Some(doc?)),
                None => Ok(None),
            }
        };
        let oldest = edge(SortOrder::TimestampAscending)?;
        let newest = edge(SortOrder::TimestampDescending)?;

        Ok(PartitionSummary {
            partition: partition.name().to_string(),
            document_count,
            oldest: oldest.map(|d| d.document.timestamp),
            newest: newest.as_ref().map(|d| d.document.timestamp),
            latest_metric_keys: newest
                .map(|d| d.document.metrics.into_keys().collect())
                .unwrap_or_default(),
        })
    }

    /// Move every document of a symbol's partition into `<partition><suffix>`.
    ///
    /// The source is only cleared once every copy succeeded, and only of the
    /// documents that were copied. Writes landing mid-archive stay in the source.
    pub fn archive_partition(&self, symbol: &str) -> Result<ArchiveReport, DataError> {
        let source = self.partition_for(symbol)?;
        let archive_name = format!("{}{}", source.name(), self.archive_suffix);
        let mut report = ArchiveReport {
            source: source.name().to_string(),
            archive: archive_name,
            archived: 0,
            removed: 0,
        };

        let documents = source
            .find(&Filter::all(), &FindOptions::default())?
            .collect::<Result<Vec<_>, _>>()?;
        if documents.is_empty() {
            log_info!(self.logger, "Nothing to archive in {}", report.source);
            return Ok(report);
        }

        let archive = self.store.partition(&report.archive)?;
        let mut copied = Vec::with_capacity(documents.len());
        for stored in documents {
            archive.insert_one(stored.document)?;
            copied.push(stored.id);
            report.archived += 1;
        }
        report.removed = source.delete_many(&Filter::all().with_ids(copied))?;

        log_info!(
            self.logger,
            "Archived {} documents from {} to {}",
            report.archived,
            report.source,
            report.archive
        );
        Ok(report)
    }

    // =========================================================================
    // Realtime queues
    // =========================================================================

    /// Snapshot of a queue, oldest first. Unknown names give an empty list.
    pub fn get_realtime_queue(&self, name: &str) -> Vec<RealtimeEntry> {
        match name.parse::<QueueName>() {
            Ok(queue) => self.realtime_queue(queue),
            Err(_) => Vec::new(),
        }
    }

    pub fn realtime_queue(&self, name: QueueName) -> Vec<RealtimeEntry> {
        self.queues.lock().get(name).snapshot()
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub fn cache_put(&self, key: impl Into<String>, data: Vec<u8>) -> Result<(), CacheError> {
        let evicted = self.cache.put(key, data)?;
        if evicted > 0 {
            log_debug!(self.logger, "Data cache evicted {} entries", evicted);
        }
        Ok(())
    }

    pub fn cache_get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_size_bytes(&self) -> usize {
        self.cache.size_bytes()
    }

    /// Empty the data cache. Safe to call repeatedly.
    pub fn clear_cache(&self) {
        self.cache.clear();
        log_info!(self.logger, "Data cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NoDelay;
    use crate::log::{CaptureLogger, LogLevel, NoOpLogger};
    use crate::store::MemoryStore;
    use crate::system::HardwareProfile;
    use chrono::TimeZone;

    fn setup() -> (Arc<MemoryStore>, DataManager) {
        let store = Arc::new(MemoryStore::new("test_db"));
        store.connect().unwrap();
        let config = Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()));
        let manager = DataManager::new_with_logger(store.clone(), config, Arc::new(NoOpLogger))
            .with_throttle(Arc::new(NoDelay));
        (store, manager)
    }

    fn metrics(price: f64) -> Metrics {
        let mut m = Metrics::new();
        m.insert("price".to_string(), price);
        m
    }

    fn insert_at(store: &MemoryStore, symbol: &str, ts: DateTime<Utc>, price: f64) {
        store
            .partition(&symbol.to_lowercase())
            .unwrap()
            .insert_one(MetricDocument::at(symbol, metrics(price), ts))
            .unwrap();
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_manager_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DataManager>();
    }

    #[test]
    fn test_save_metrics_uses_lowercase_partition() {
        let (store, manager) = setup();
        assert!(manager.save_metrics(&metrics(1.0), "BTCUSDT"));
        assert_eq!(store.list_partition_names().unwrap(), vec!["btcusdt".to_string()]);
    }

    #[test]
    fn test_save_metrics_publishes_snapshot() {
        let (_store, manager) = setup();
        let record = manager.try_save_metrics(&metrics(42.0), "ETHUSDT").unwrap();

        let queue = manager.get_realtime_queue("metrics");
        assert_eq!(queue.len(), 1);
        let snapshot = queue[0].as_metric().unwrap();
        assert_eq!(snapshot.id, record.id);
        assert_eq!(snapshot.symbol, "ETHUSDT");
        assert_eq!(snapshot.metrics["price"], 42.0);
    }

    #[test]
    fn test_save_failure_records_error() {
        let (store, manager) = setup();
        store.set_online(false);

        assert!(!manager.save_metrics(&metrics(1.0), "BTCUSDT"));

        let errors = manager.get_realtime_queue("errors");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].as_error().unwrap().operation, "save_metrics");
        assert!(manager.get_realtime_queue("metrics").is_empty());
    }

    #[test]
    fn test_latest_metrics_newest_first() {
        let (store, manager) = setup();
        for d in 1..=5 {
            insert_at(&store, "BTCUSDT", day(d), d as f64);
        }

        let latest = manager.get_latest_metrics("BTCUSDT", 3);
        let prices: Vec<f64> = latest.iter().map(|r| r.metrics["price"]).collect();
        assert_eq!(prices, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_latest_metrics_zero_limit_is_empty() {
        let (store, manager) = setup();
        insert_at(&store, "BTCUSDT", day(1), 1.0);
        assert!(manager.try_get_latest_metrics("BTCUSDT", 0).unwrap().is_empty());
    }

    #[test]
    fn test_latest_metrics_distinguishes_empty_from_failure() {
        let (store, manager) = setup();
        assert!(manager.try_get_latest_metrics("BTCUSDT", 10).unwrap().is_empty());

        store.set_online(false);
        assert!(manager.try_get_latest_metrics("BTCUSDT", 10).is_err());
        assert!(manager.get_latest_metrics("BTCUSDT", 10).is_empty());
        assert_eq!(manager.get_realtime_queue("errors").len(), 1);
    }

    #[test]
    fn test_historical_rejects_zero_batch() {
        let (_store, manager) = setup();
        let query = HistoricalQuery::new("BTCUSDT", day(1), day(3)).with_batch_size(0);
        let result = manager.try_get_historical_data(&query, &CancellationToken::new());
        assert!(matches!(result, Err(DataError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_historical_rejects_zero_window() {
        let (_store, manager) = setup();
        let manager = manager.with_window(Duration::zero());
        let query = HistoricalQuery::new("BTCUSDT", day(1), day(3));
        let result = manager.try_get_historical_data(&query, &CancellationToken::new());
        assert!(matches!(result, Err(DataError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_historical_inverted_range_is_empty() {
        let (store, manager) = setup();
        store.set_online(false);
        // No store access happens, so an offline store doesn't matter.
        let query = HistoricalQuery::new("BTCUSDT", day(3), day(1));
        let frame = manager
            .try_get_historical_data(&query, &CancellationToken::new())
            .unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_historical_concatenates_windows_in_order() {
        let (store, manager) = setup();
        insert_at(&store, "BTCUSDT", day(2) + Duration::hours(6), 3.0);
        insert_at(&store, "BTCUSDT", day(1) + Duration::hours(12), 2.0);
        insert_at(&store, "BTCUSDT", day(1) + Duration::hours(1), 1.0);
        insert_at(&store, "BTCUSDT", day(3), 99.0);

        let frame = manager.get_historical_data("BTCUSDT", day(1), day(3), None);

        // Window order across days; natural order within a window.
        assert_eq!(frame.column("price"), Some(vec![Some(2.0), Some(1.0), Some(3.0)]));
        assert_eq!(frame.columns(), vec!["timestamp", "symbol", "price"]);
    }

    #[test]
    fn test_historical_cancelled_before_first_window() {
        let (_store, manager) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let query = HistoricalQuery::new("BTCUSDT", day(1), day(3));
        let result = manager.try_get_historical_data(&query, &cancel);

        assert!(matches!(
            result,
            Err(DataError::Cancelled {
                windows_completed: 0
            })
        ));
    }

    #[test]
    fn test_injected_logger_sees_initialization() {
        let logger = Arc::new(CaptureLogger::new());
        let config = Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()));
        let store = Arc::new(MemoryStore::new("test_db"));
        let _manager = DataManager::new_with_logger(store, config, logger.clone());

        assert!(logger.contains("DataManager initialized with cache limit: 1024MB"));
    }

    #[test]
    fn test_historical_logs_total() {
        let store = Arc::new(MemoryStore::new("test_db"));
        store.connect().unwrap();
        let logger = Arc::new(CaptureLogger::new());
        let config = Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()));
        let manager = DataManager::new(store.clone(), config)
            .with_logger(logger.clone())
            .with_throttle(Arc::new(NoDelay));
        insert_at(&store, "BTCUSDT", day(1), 1.0);

        manager.get_historical_data("BTCUSDT", day(1), day(2), None);

        assert!(logger.contains("Loaded 1 historical records for BTCUSDT"));
        assert_eq!(logger.count_at(LogLevel::Error), 0);
    }

    #[test]
    fn test_default_batch_size_follows_tier_then_settings() {
        let (_store, manager) = setup();
        assert_eq!(manager.default_historical_batch_size(), 10_000);

        let mut settings = ConfigFile::default();
        settings.fetch.historical_batch_size = Some(777);
        let manager = manager.with_settings(&settings);
        assert_eq!(manager.default_historical_batch_size(), 777);
    }

    #[test]
    fn test_with_settings_resizes_queues() {
        let (_store, manager) = setup();
        let mut settings = ConfigFile::default();
        settings.queues.signals_capacity = 2;
        let manager = manager
            .with_settings(&settings)
            .with_throttle(Arc::new(NoDelay));

        for i in 0..5 {
            manager.record_signal(SignalEntry::new("BTCUSDT", "buy", i as f64));
        }

        assert_eq!(manager.get_realtime_queue("signals").len(), 2);
    }

    #[test]
    fn test_cleanup_before_cutoff() {
        let (store, manager) = setup();
        insert_at(&store, "BTCUSDT", day(1), 1.0);
        insert_at(&store, "BTCUSDT", day(10), 2.0);
        insert_at(&store, "ETHUSDT", day(2), 3.0);

        assert_eq!(manager.try_cleanup_old_data_before(day(5)).unwrap(), 2);
        assert_eq!(manager.get_latest_metrics("BTCUSDT", 10).len(), 1);
        assert!(manager.get_latest_metrics("ETHUSDT", 10).is_empty());
    }

    #[test]
    fn test_cleanup_failure_returns_zero() {
        let (store, manager) = setup();
        store.set_online(false);
        assert_eq!(manager.cleanup_old_data(30), 0);
        assert_eq!(
            manager.get_realtime_queue("errors")[0]
                .as_error()
                .unwrap()
                .operation,
            "cleanup_old_data"
        );
    }

    #[test]
    fn test_unknown_queue_is_empty() {
        let (_store, manager) = setup();
        assert!(manager.get_realtime_queue("orders").is_empty());
    }

    #[test]
    fn test_cache_respects_tier_limit() {
        let (_store, manager) = setup();
        let limit = manager.system_config().resources.memory_limits.data_cache_bytes();

        manager.cache_put("frame:btcusdt", vec![0u8; 1024]).unwrap();
        assert_eq!(manager.cache_size_bytes(), 1024);
        assert!(manager.cache_put("huge", vec![0u8; limit + 1]).is_err());

        manager.clear_cache();
        manager.clear_cache();
        assert_eq!(manager.cache_size_bytes(), 0);
        assert_eq!(manager.cache_get("frame:btcusdt"), None);
    }

    #[test]
    fn test_describe_partition() {
        let (store, manager) = setup();
        insert_at(&store, "BTCUSDT", day(3), 1.0);
        insert_at(&store, "BTCUSDT", day(1), 2.0);
        insert_at(&store, "BTCUSDT", day(2), 3.0);

        let summary = manager.describe_partition("BTCUSDT").unwrap();

        assert_eq!(summary.partition, "btcusdt");
        assert_eq!(summary.document_count, 3);
        assert_eq!(summary.oldest, Some(day(1)));
        assert_eq!(summary.newest, Some(day(3)));
        assert_eq!(summary.latest_metric_keys, vec!["price".to_string()]);
    }

    #[test]
    fn test_describe_empty_partition() {
        let (_store, manager) = setup();
        let summary = manager.describe_partition("SOLUSDT").unwrap();
        assert_eq!(summary.document_count, 0);
        assert_eq!(summary.oldest, None);
        assert!(summary.latest_metric_keys.is_empty());
    }

    #[test]
    fn test_archive_partition_moves_documents() {
        let (store, manager) = setup();
        for d in 1..=4 {
            insert_at(&store, "BTCUSDT", day(d), d as f64);
        }

        let report = manager.archive_partition("BTCUSDT").unwrap();

        assert_eq!(report.source, "btcusdt");
        assert_eq!(report.archive, "btcusdt_archive");
        assert_eq!(report.archived, 4);
        assert_eq!(report.removed, 4);

        let archive = store.partition("btcusdt_archive").unwrap();
        assert_eq!(archive.count_documents(&Filter::all()).unwrap(), 4);
        assert!(manager.get_latest_metrics("BTCUSDT", 10).is_empty());
    }

    #[test]
    fn test_archive_empty_partition_is_noop() {
        let (store, manager) = setup();
        let report = manager.archive_partition("BTCUSDT").unwrap();

        assert_eq!(report.archived, 0);
        assert!(!store
            .list_partition_names()
            .unwrap()
            .contains(&"btcusdt_archive".to_string()));
    }
}
