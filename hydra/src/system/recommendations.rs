//! Resource sizing derived from a [`HardwareProfile`].
//!
//! Everything here is a pure function of the profile: the same hardware
//! always yields the same [`ResourceConfig`].

use serde::Serialize;
use std::fmt;

use super::hardware::HardwareProfile;

/// RAM band used to step-function the resource configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTier {
    /// Under 16 GB.
    Laptop,
    /// 16 GB up to 32 GB.
    Workstation,
    /// 32 GB and above.
    Server,
}

impl ResourceTier {
    /// # RAM Tiers
    ///
    /// | System RAM | Tier |
    /// |------------|------|
    /// | < 16 GB    | Laptop |
    /// | 16-31 GB   | Workstation |
    /// | 32+ GB     | Server |
    pub fn from_ram_gb(total_ram_gb: f64) -> Self {
        if total_ram_gb >= 32.0 {
            ResourceTier::Server
        } else if total_ram_gb >= 16.0 {
            ResourceTier::Workstation
        } else {
            ResourceTier::Laptop
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceTier::Laptop => "laptop",
            ResourceTier::Workstation => "workstation",
            ResourceTier::Server => "server",
        }
    }

    pub fn batch_sizes(&self) -> BatchSizes {
        match self {
            ResourceTier::Server => SERVER_BATCH_SIZES,
            ResourceTier::Workstation => WORKSTATION_BATCH_SIZES,
            ResourceTier::Laptop => LAPTOP_BATCH_SIZES,
        }
    }

    pub fn memory_limits(&self) -> MemoryLimits {
        match self {
            ResourceTier::Server => SERVER_MEMORY_LIMITS,
            ResourceTier::Workstation => WORKSTATION_MEMORY_LIMITS,
            ResourceTier::Laptop => LAPTOP_MEMORY_LIMITS,
        }
    }
}

impl fmt::Display for ResourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a batch size is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchPurpose {
    Historical,
    Realtime,
    MlTraining,
    MlInference,
}

impl BatchPurpose {
    pub const ALL: [BatchPurpose; 4] = [
        BatchPurpose::Historical,
        BatchPurpose::Realtime,
        BatchPurpose::MlTraining,
        BatchPurpose::MlInference,
    ];
}

/// What a memory ceiling is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryPurpose {
    DataCache,
    ModelCache,
    MaxDatasetSize,
}

impl MemoryPurpose {
    pub const ALL: [MemoryPurpose; 3] = [
        MemoryPurpose::DataCache,
        MemoryPurpose::ModelCache,
        MemoryPurpose::MaxDatasetSize,
    ];
}

/// Records per batch, by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSizes {
    pub historical: usize,
    pub realtime: usize,
    pub ml_training: usize,
    pub ml_inference: usize,
}

impl BatchSizes {
    pub fn get(&self, purpose: BatchPurpose) -> usize {
        match purpose {
            BatchPurpose::Historical => self.historical,
            BatchPurpose::Realtime => self.realtime,
            BatchPurpose::MlTraining => self.ml_training,
            BatchPurpose::MlInference => self.ml_inference,
        }
    }
}

/// Memory ceilings in MB, by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryLimits {
    pub data_cache: usize,
    pub model_cache: usize,
    pub max_dataset_size: usize,
}

impl MemoryLimits {
    pub fn get(&self, purpose: MemoryPurpose) -> usize {
        match purpose {
            MemoryPurpose::DataCache => self.data_cache,
            MemoryPurpose::ModelCache => self.model_cache,
            MemoryPurpose::MaxDatasetSize => self.max_dataset_size,
        }
    }

    /// Data cache ceiling in bytes, saturating at `usize::MAX`.
    pub fn data_cache_bytes(&self) -> usize {
        self.data_cache.saturating_mul(1024 * 1024)
    }
}

// =============================================================================
// Tier tables
// =============================================================================

const SERVER_BATCH_SIZES: BatchSizes = BatchSizes {
    historical: 50_000,
    realtime: 2_000,
    ml_training: 2_048,
    ml_inference: 1_024,
};

const WORKSTATION_BATCH_SIZES: BatchSizes = BatchSizes {
    historical: 25_000,
    realtime: 1_000,
    ml_training: 1_024,
    ml_inference: 512,
};

const LAPTOP_BATCH_SIZES: BatchSizes = BatchSizes {
    historical: 10_000,
    realtime: 500,
    ml_training: 512,
    ml_inference: 256,
};

const SERVER_MEMORY_LIMITS: MemoryLimits = MemoryLimits {
    data_cache: 8_192,
    model_cache: 4_096,
    max_dataset_size: 16_384,
};

const WORKSTATION_MEMORY_LIMITS: MemoryLimits = MemoryLimits {
    data_cache: 4_096,
    model_cache: 2_048,
    max_dataset_size: 8_192,
};

const LAPTOP_MEMORY_LIMITS: MemoryLimits = MemoryLimits {
    data_cache: 1_024,
    model_cache: 512,
    max_dataset_size: 2_048,
};

/// Minimum RAM for GPU acceleration to be worth enabling.
const GPU_ACCELERATION_MIN_RAM_GB: f64 = 8.0;

/// Resource policy consumed by every other component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceConfig {
    pub tier: ResourceTier,
    /// Sizing hint for callers that parallelize; always at least 1.
    pub max_workers: usize,
    pub batch_sizes: BatchSizes,
    pub memory_limits: MemoryLimits,
    pub use_gpu_acceleration: bool,
}

impl ResourceConfig {
    /// Derive the policy for `profile`.
    ///
    /// ```
    /// use hydra::system::{HardwareProfile, ResourceConfig, ResourceTier};
    ///
    /// let server = HardwareProfile {
    ///     total_ram_gb: 64.0,
    ///     logical_cores: 32,
    ///     ..HardwareProfile::fallback()
    /// };
    /// let config = ResourceConfig::derive(&server);
    ///
    /// assert_eq!(config.tier, ResourceTier::Server);
    /// assert_eq!(config.max_workers, 28);
    /// assert_eq!(config.batch_sizes.historical, 50_000);
    /// ```
    pub fn derive(profile: &HardwareProfile) -> Self {
        let tier = ResourceTier::from_ram_gb(profile.total_ram_gb);
        Self {
            tier,
            max_workers: recommended_max_workers(tier, profile.logical_cores),
            batch_sizes: tier.batch_sizes(),
            memory_limits: tier.memory_limits(),
            use_gpu_acceleration: use_gpu_acceleration(profile),
        }
    }
}

/// Worker count for a tier, leaving headroom for the OS and the store.
///
/// | Tier | Workers |
/// |------|---------|
/// | Server | logical − 4 |
/// | Workstation | logical − 2 |
/// | Laptop | min(4, logical − 1) |
///
/// Never below 1.
pub fn recommended_max_workers(tier: ResourceTier, logical_cores: usize) -> usize {
    let workers = match tier {
        ResourceTier::Server => logical_cores.saturating_sub(4),
        ResourceTier::Workstation => logical_cores.saturating_sub(2),
        ResourceTier::Laptop => logical_cores.saturating_sub(1).min(4),
    };
    workers.max(1)
}

pub fn use_gpu_acceleration(profile: &HardwareProfile) -> bool {
    profile.has_gpu && profile.total_ram_gb >= GPU_ACCELERATION_MIN_RAM_GB
}

/// True when RAM < 16 GB or fewer than 6 physical cores.
pub fn should_use_simple_mode(profile: &HardwareProfile) -> bool {
    profile.total_ram_gb < 16.0 || profile.physical_cores < 6
}

/// Model-training backend family suited to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MlBackend {
    /// GPU deep-learning stack.
    Heavy,
    /// CPU classical-ML stack.
    Light,
}

impl fmt::Display for MlBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlBackend::Heavy => f.write_str("heavy"),
            MlBackend::Light => f.write_str("light"),
        }
    }
}

pub fn recommended_ml_backend(profile: &HardwareProfile) -> MlBackend {
    if profile.has_gpu && profile.total_ram_gb >= 16.0 {
        MlBackend::Heavy
    } else {
        MlBackend::Light
    }
}
