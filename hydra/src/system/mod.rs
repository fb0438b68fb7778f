//! Hardware detection and hardware-adaptive resource sizing.
//!
//! Detection produces a [`HardwareProfile`]; [`ResourceConfig::derive`] turns
//! it into worker counts, batch sizes and memory ceilings. Both travel
//! together as a [`SystemConfig`].
//!
//! ```
//! use hydra::system::{HardwareProfile, SystemConfig};
//!
//! // At startup: probe once, share everywhere.
//! let config = SystemConfig::from_profile(HardwareProfile::fallback());
//!
//! println!("Workers: {}", config.resources.max_workers);
//! println!("Historical batch: {}", config.resources.batch_sizes.historical);
//! println!("Data cache: {} MB", config.resources.memory_limits.data_cache);
//! ```
//!
//! # Design Notes
//!
//! Probing never fails from the caller's point of view. Hosts where memory
//! or CPU facts cannot be read get [`HardwareProfile::fallback`]; hosts
//! without GPU tooling are simply reported as having no GPU.

mod hardware;
mod probe;
mod recommendations;
mod snapshot;

pub use hardware::{GpuInfo, HardwareProfile, OsFamily};
pub use probe::{HardwareProbe, ProbeError, SystemProbe};
pub use recommendations::{
    recommended_max_workers, recommended_ml_backend, should_use_simple_mode,
    use_gpu_acceleration, BatchPurpose, BatchSizes, MemoryLimits, MemoryPurpose, MlBackend,
    ResourceConfig, ResourceTier,
};
pub use snapshot::{format_megabytes, ConfigSummary, SystemConfig};
