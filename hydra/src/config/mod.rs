//! User configuration (`~/.hydra/config.ini`).
//!
//! Hardware-derived sizing lives in [`crate::system`]; this module covers
//! what an operator sets by hand: where the store is, how the historical
//! fetch paces itself, queue capacities, retention, and log location.
//!
//! ```
//! use hydra::config::ConfigFile;
//!
//! let mut config = ConfigFile::default();
//! config.apply_env_overrides(|_| None);
//! assert_eq!(config.fetch.window_hours, 24);
//! ```

mod defaults;
mod env;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use env::{ENV_STORE_DATABASE, ENV_STORE_URI};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, FetchSettings, LoggingSettings, QueueSettings, RetentionSettings, StoreSettings,
};
