//! Host hardware snapshot and its fail-soft detection.

use serde::Serialize;
use std::fmt;

use super::probe::{HardwareProbe, ProbeError, SystemProbe};
use super::recommendations::{recommended_ml_backend, should_use_simple_mode, MlBackend};
use crate::log::{Logger, TracingLogger};
use crate::{log_debug, log_error, log_warn};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Operating system family of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Windows,
    MacOs,
    Other(String),
    Unknown,
}

impl OsFamily {
    /// Family of the platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            "macos" | "darwin" => OsFamily::MacOs,
            "" => OsFamily::Unknown,
            other => OsFamily::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Linux => f.write_str("Linux"),
            OsFamily::Windows => f.write_str("Windows"),
            OsFamily::MacOs => f.write_str("macOS"),
            OsFamily::Other(name) => f.write_str(name),
            OsFamily::Unknown => f.write_str("Unknown"),
        }
    }
}

/// First discrete GPU found on the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuInfo {
    pub name: String,
    pub memory_total_mb: f64,
    pub memory_free_mb: f64,
    pub driver: Option<String>,
    pub temperature_c: Option<f64>,
}

/// Hardware detected once at process start.
///
/// Never mutated after construction. Build one with [`HardwareProfile::detect`]
/// in production, or with struct-update syntax over
/// [`HardwareProfile::fallback`] in tests:
///
/// ```
/// use hydra::system::HardwareProfile;
///
/// let workstation = HardwareProfile {
///     total_ram_gb: 24.0,
///     physical_cores: 8,
///     logical_cores: 16,
///     ..HardwareProfile::fallback()
/// };
/// assert!(!workstation.should_use_simple_mode());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareProfile {
    /// Total RAM in GB, rounded to two decimals.
    pub total_ram_gb: f64,
    pub physical_cores: usize,
    pub logical_cores: usize,
    /// Current CPU frequency in MHz; 0 when the platform doesn't report it.
    pub cpu_frequency_mhz: f64,
    pub has_gpu: bool,
    pub gpu: Option<GpuInfo>,
    pub os: OsFamily,
    /// Best-effort: true when a battery is present.
    pub is_laptop: bool,
}

impl HardwareProfile {
    /// Profile substituted when probing fails: a modest 8 GB laptop.
    pub fn fallback() -> Self {
        Self {
            total_ram_gb: 8.0,
            physical_cores: 4,
            logical_cores: 8,
            cpu_frequency_mhz: 2100.0,
            has_gpu: false,
            gpu: None,
            os: OsFamily::Unknown,
            is_laptop: true,
        }
    }

    /// Probe the current host with [`SystemProbe`]. Never fails.
    pub fn detect() -> Self {
        Self::detect_with(&SystemProbe::new(), &TracingLogger)
    }

    /// Probe through `probe`, substituting [`HardwareProfile::fallback`] on error.
    pub fn detect_with(probe: &dyn HardwareProbe, logger: &dyn Logger) -> Self {
        match Self::try_detect(probe, logger) {
            Ok(profile) => profile,
            Err(e) => {
                log_error!(logger, "Hardware detection failed ({}), using default profile", e);
                Self::fallback()
            }
        }
    }

    /// Probe through `probe`.
    ///
    /// Memory and CPU failures are returned. GPU and device-class failures
    /// only cost those two facts: they are logged and read as "no GPU" and
    /// "not a laptop".
    pub fn try_detect(
        probe: &dyn HardwareProbe,
        logger: &dyn Logger,
    ) -> Result<Self, ProbeError> {
        let total_bytes = probe.total_memory_bytes()?;
        if total_bytes == 0 {
            return Err(ProbeError::Host("reported zero total memory".to_string()));
        }

        let logical_cores = probe.logical_cores()?.max(1);
        let physical_cores = probe.physical_cores()?.clamp(1, logical_cores);
        let cpu_frequency_mhz = probe.cpu_frequency_mhz()?;

        let gpu = match probe.gpu() {
            Ok(gpu) => gpu,
            Err(e) => {
                log_warn!(logger, "GPU detection failed, continuing without GPU: {}", e);
                None
            }
        };

        let is_laptop = match probe.is_laptop() {
            Ok(laptop) => laptop,
            Err(e) => {
                log_debug!(logger, "Device class detection failed: {}", e);
                false
            }
        };

        Ok(Self {
            total_ram_gb: round_gb(total_bytes as f64 / BYTES_PER_GB),
            physical_cores,
            logical_cores,
            cpu_frequency_mhz,
            has_gpu: gpu.is_some(),
            gpu,
            os: probe.os_family(),
            is_laptop,
        })
    }

    /// Coarse "reduced feature set" signal for ML collaborators.
    pub fn should_use_simple_mode(&self) -> bool {
        should_use_simple_mode(self)
    }

    pub fn recommended_ml_backend(&self) -> MlBackend {
        recommended_ml_backend(self)
    }
}

fn round_gb(gb: f64) -> f64 {
    (gb * 100.0).round() / 100.0
}
