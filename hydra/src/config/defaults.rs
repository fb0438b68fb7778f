//! Default values for every configuration setting.

use std::path::PathBuf;

use super::settings::*;

// =============================================================================
// Store defaults
// =============================================================================

/// Local MongoDB endpoint used when nothing else is configured.
pub const DEFAULT_STORE_URI: &str = "mongodb://localhost:27017/";

pub const DEFAULT_STORE_DATABASE: &str = "hydra_metrics";

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_MAX_POOL_SIZE: u32 = 10;

pub const DEFAULT_MIN_POOL_SIZE: u32 = 1;

// =============================================================================
// Fetch defaults
// =============================================================================

/// One window per day of history.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Pause between window queries, keeps a long backfill from hammering the store.
pub const DEFAULT_INTER_WINDOW_DELAY_MS: u64 = 100;

// =============================================================================
// Queue defaults
// =============================================================================

pub const DEFAULT_METRICS_QUEUE_CAPACITY: usize = 1000;

pub const DEFAULT_SIGNALS_QUEUE_CAPACITY: usize = 500;

pub const DEFAULT_ERRORS_QUEUE_CAPACITY: usize = 100;

// =============================================================================
// Retention defaults
// =============================================================================

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

pub const DEFAULT_ARCHIVE_SUFFIX: &str = "_archive";

// =============================================================================
// Logging defaults
// =============================================================================

pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_LOG_FILE: &str = "hydra.log";

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_STORE_URI.to_string(),
            database: DEFAULT_STORE_DATABASE.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            inter_window_delay_ms: DEFAULT_INTER_WINDOW_DELAY_MS,
            historical_batch_size: None,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            metrics_capacity: DEFAULT_METRICS_QUEUE_CAPACITY,
            signals_capacity: DEFAULT_SIGNALS_QUEUE_CAPACITY,
            errors_capacity: DEFAULT_ERRORS_QUEUE_CAPACITY,
        }
    }
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            older_than_days: DEFAULT_RETENTION_DAYS,
            archive_suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            fetch: FetchSettings::default(),
            queues: QueueSettings::default(),
            retention: RetentionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
