//! INI serialization: `ConfigFile` → commented INI text.

use super::settings::ConfigFile;

/// Render `config` as the commented INI document written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let batch_size = config
        .fetch
        .historical_batch_size
        .map(|n| n.to_string())
        .unwrap_or_default();

    format!(
        r#"[store]
; Document store connection. MONGODB_URI and MONGODB_DB_NAME override these.
uri = {}
database = {}
connect_timeout_ms = {}
socket_timeout_ms = {}
max_pool_size = {}
min_pool_size = {}

[fetch]
; Width of each window walked by the historical fetch (hours)
window_hours = {}
; Pause between window queries (milliseconds, 0 disables)
inter_window_delay_ms = {}
; Page-size hint for historical queries. Empty = derived from system RAM.
historical_batch_size = {}

[queues]
; Capacities of the in-memory real-time queues (oldest entries are dropped)
metrics_capacity = {}
signals_capacity = {}
errors_capacity = {}

[retention]
; Cleanup removes documents older than this many days
older_than_days = {}
; Archive partition name = <partition><archive_suffix>
archive_suffix = {}

[logging]
directory = {}
file = {}
"#,
        config.store.uri,
        config.store.database,
        config.store.connect_timeout_ms,
        config.store.socket_timeout_ms,
        config.store.max_pool_size,
        config.store.min_pool_size,
        config.fetch.window_hours,
        config.fetch.inter_window_delay_ms,
        batch_size,
        config.queues.metrics_capacity,
        config.queues.signals_capacity,
        config.queues.errors_capacity,
        config.retention.older_than_days,
        config.retention.archive_suffix,
        config.logging.directory.display(),
        config.logging.file,
    )
}
