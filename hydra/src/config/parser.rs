//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names map to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [store]
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = non_empty(section, "uri") {
            config.store.uri = v.to_string();
        }
        if let Some(v) = non_empty(section, "database") {
            config.store.database = v.to_string();
        }
        if let Some(v) = section.get("connect_timeout_ms") {
            config.store.connect_timeout_ms = parse_positive("store", "connect_timeout_ms", v)?;
        }
        if let Some(v) = section.get("socket_timeout_ms") {
            config.store.socket_timeout_ms = parse_positive("store", "socket_timeout_ms", v)?;
        }
        if let Some(v) = section.get("max_pool_size") {
            config.store.max_pool_size =
                parse_positive("store", "max_pool_size", v)?;
        }
        if let Some(v) = section.get("min_pool_size") {
            config.store.min_pool_size =
                parse_value("store", "min_pool_size", v, "must be a non-negative integer")?;
        }
        if config.store.min_pool_size > config.store.max_pool_size {
            return Err(ConfigFileError::InvalidValue {
                section: "store".to_string(),
                key: "min_pool_size".to_string(),
                value: config.store.min_pool_size.to_string(),
                reason: format!("must not exceed max_pool_size ({})", config.store.max_pool_size),
            });
        }
    }

    // [fetch]
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = section.get("window_hours") {
            config.fetch.window_hours = parse_positive("fetch", "window_hours", v)?;
        }
        if let Some(v) = section.get("inter_window_delay_ms") {
            config.fetch.inter_window_delay_ms = parse_value(
                "fetch",
                "inter_window_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = non_empty(section, "historical_batch_size") {
            config.fetch.historical_batch_size =
                Some(parse_positive("fetch", "historical_batch_size", v)?);
        }
    }

    // [queues]
    if let Some(section) = ini.section(Some("queues")) {
        if let Some(v) = section.get("metrics_capacity") {
            config.queues.metrics_capacity = parse_positive("queues", "metrics_capacity", v)?;
        }
        if let Some(v) = section.get("signals_capacity") {
            config.queues.signals_capacity = parse_positive("queues", "signals_capacity", v)?;
        }
        if let Some(v) = section.get("errors_capacity") {
            config.queues.errors_capacity = parse_positive("queues", "errors_capacity", v)?;
        }
    }

    // [retention]
    if let Some(section) = ini.section(Some("retention")) {
        if let Some(v) = section.get("older_than_days") {
            config.retention.older_than_days = parse_value(
                "retention",
                "older_than_days",
                v,
                "must be a non-negative integer (days)",
            )?;
        }
        if let Some(v) = non_empty(section, "archive_suffix") {
            config.retention.archive_suffix = v.to_string();
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

/// Trimmed value of `key`, or `None` when missing or blank.
fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
}

/// Parse an integer that must be at least 1.
fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    let parsed: T = parse_value(section, key, value, "must be a positive integer")?;
    if parsed < T::from(1) {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }
    Ok(parsed)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
