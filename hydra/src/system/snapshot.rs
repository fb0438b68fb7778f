//! The configuration value shared by every component.

use serde::Serialize;

use super::hardware::HardwareProfile;
use super::probe::HardwareProbe;
use super::recommendations::{MlBackend, ResourceConfig};
use crate::log::{Logger, TracingLogger};
use crate::log_info;

/// Detected hardware plus the resource policy derived from it.
///
/// Built once at startup and handed to components as `Arc<SystemConfig>`.
/// There is no global instance.
///
/// ```
/// use hydra::system::{HardwareProfile, SystemConfig};
///
/// let config = SystemConfig::from_profile(HardwareProfile::fallback());
/// assert_eq!(config.resources.batch_sizes.historical, 10_000);
/// assert!(config.should_use_simple_mode());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfig {
    pub hardware: HardwareProfile,
    pub resources: ResourceConfig,
}

impl SystemConfig {
    pub fn from_profile(hardware: HardwareProfile) -> Self {
        let resources = ResourceConfig::derive(&hardware);
        Self {
            hardware,
            resources,
        }
    }

    /// Detect the current host and log the result.
    pub fn detect() -> Self {
        let config = Self::from_profile(HardwareProfile::detect());
        config.log_summary(&TracingLogger);
        config
    }

    /// Detect through a custom probe; probe failures degrade to the fallback profile.
    pub fn detect_with(probe: &dyn HardwareProbe, logger: &dyn Logger) -> Self {
        let config = Self::from_profile(HardwareProfile::detect_with(probe, logger));
        config.log_summary(logger);
        config
    }

    pub fn should_use_simple_mode(&self) -> bool {
        self.hardware.should_use_simple_mode()
    }

    pub fn recommended_ml_backend(&self) -> MlBackend {
        self.hardware.recommended_ml_backend()
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            hardware: self.hardware.clone(),
            optimization: self.resources.clone(),
            simple_mode: self.should_use_simple_mode(),
            ml_backend: self.recommended_ml_backend(),
        }
    }

    /// Startup banner with the detected hardware and chosen policy.
    pub fn log_summary(&self, logger: &dyn Logger) {
        let hw = &self.hardware;
        let res = &self.resources;

        log_info!(logger, "{}", "=".repeat(50));
        log_info!(logger, "HYDRA SYSTEM CONFIGURATION DETECTED");
        log_info!(logger, "{}", "=".repeat(50));
        log_info!(logger, "Total RAM: {} GB ({} tier)", hw.total_ram_gb, res.tier);
        log_info!(
            logger,
            "CPU Cores: {} physical, {} logical @ {} MHz",
            hw.physical_cores,
            hw.logical_cores,
            hw.cpu_frequency_mhz
        );
        match &hw.gpu {
            Some(gpu) => log_info!(
                logger,
                "GPU: {} ({} MB)",
                gpu.name,
                gpu.memory_total_mb
            ),
            None => log_info!(logger, "GPU: none"),
        }
        log_info!(logger, "OS: {} (laptop: {})", hw.os, hw.is_laptop);
        log_info!(logger, "Max Workers: {}", res.max_workers);
        log_info!(
            logger,
            "Data cache: {}, model cache: {}, max dataset: {}",
            format_megabytes(res.memory_limits.data_cache),
            format_megabytes(res.memory_limits.model_cache),
            format_megabytes(res.memory_limits.max_dataset_size)
        );
        log_info!(logger, "Use GPU Acceleration: {}", res.use_gpu_acceleration);
        log_info!(logger, "{}", "=".repeat(50));
    }
}

/// Serializable report of a [`SystemConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub hardware: HardwareProfile,
    pub optimization: ResourceConfig,
    pub simple_mode: bool,
    pub ml_backend: MlBackend,
}

/// Format a MB figure, switching to GB for whole gigabytes.
///
/// ```
/// use hydra::system::format_megabytes;
///
/// assert_eq!(format_megabytes(8192), "8 GB");
/// assert_eq!(format_megabytes(512), "512 MB");
/// ```
pub fn format_megabytes(mb: usize) -> String {
    if mb >= 1024 && mb % 1024 == 0 {
        format!("{} GB", mb / 1024)
    } else {
        format!("{} MB", mb)
    }
}
