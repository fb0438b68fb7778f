//! Settings structs for all configuration sections.
//!
//! Each struct is one `[section]` of `config.ini`. Parsing lives in
//! [`super::parser`], serialization in [`super::writer`].

use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub store: StoreSettings,
    pub fetch: FetchSettings,
    pub queues: QueueSettings,
    pub retention: RetentionSettings,
    pub logging: LoggingSettings,
}

/// Document-store connection settings.
///
/// [`MemoryStore::from_settings`](crate::store::MemoryStore::from_settings)
/// reads the database name. The URI, timeouts and pool bounds are passed
/// through unchanged to whichever networked driver backs
/// [`crate::store::DocumentStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Connection URI. Overridden by `MONGODB_URI`.
    pub uri: String,
    /// Database name. Overridden by `MONGODB_DB_NAME`.
    pub database: String,
    pub connect_timeout_ms: u64,
    pub socket_timeout_ms: u64,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
}

/// Historical fetch behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    /// Width of each time window walked by the historical fetch.
    pub window_hours: u32,
    /// Pause between two consecutive window queries.
    pub inter_window_delay_ms: u64,
    /// Page-size hint override. `None` uses the hardware-derived value.
    pub historical_batch_size: Option<usize>,
}

impl FetchSettings {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.window_hours))
    }

    pub fn inter_window_delay(&self) -> Duration {
        Duration::from_millis(self.inter_window_delay_ms)
    }
}

/// Capacities of the in-memory real-time queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub metrics_capacity: usize,
    pub signals_capacity: usize,
    pub errors_capacity: usize,
}

/// Data retention and archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionSettings {
    /// Documents older than this are removed by cleanup.
    pub older_than_days: u32,
    /// Suffix appended to a partition name to form its archive partition.
    pub archive_suffix: String,
}

/// Log file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}
