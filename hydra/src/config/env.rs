//! Environment variable overrides.
//!
//! Deployments point Hydra at a store without touching `config.ini`:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `MONGODB_URI` | `store.uri` |
//! | `MONGODB_DB_NAME` | `store.database` |

use super::settings::ConfigFile;

pub const ENV_STORE_URI: &str = "MONGODB_URI";

pub const ENV_STORE_DATABASE: &str = "MONGODB_DB_NAME";

impl ConfigFile {
    /// Overlay environment values on top of file values.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
    /// Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = non_blank(lookup(ENV_STORE_URI)) {
            self.store.uri = uri;
        }
        if let Some(database) = non_blank(lookup(ENV_STORE_DATABASE)) {
            self.store.database = database;
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
