//! Hydra - hardware-adaptive market-data infrastructure
//!
//! Detects the host's resources once at startup, derives worker counts,
//! batch sizes and memory ceilings from them, and uses those to drive a
//! data manager that persists per-symbol metrics and reads them back.
//!
//! ```
//! use hydra::data::DataManager;
//! use hydra::log::NoOpLogger;
//! use hydra::store::{DocumentStore, MemoryStore};
//! use hydra::system::{HardwareProfile, SystemConfig};
//! use std::sync::Arc;
//!
//! let config = Arc::new(SystemConfig::from_profile(HardwareProfile::fallback()));
//! let store = Arc::new(MemoryStore::new("hydra_metrics"));
//! store.connect().unwrap();
//!
//! let manager = DataManager::new(store, config.clone()).with_logger(Arc::new(NoOpLogger));
//! assert_eq!(manager.default_historical_batch_size(), config.resources.batch_sizes.historical);
//! ```

pub mod config;
pub mod data;
pub mod log;
pub mod logging;
pub mod store;
pub mod system;

pub use data::{DataError, DataManager};
pub use system::{HardwareProfile, ResourceConfig, SystemConfig};

/// Version of the Hydra library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
