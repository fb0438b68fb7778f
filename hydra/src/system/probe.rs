//! Pluggable hardware probing.
//!
//! [`HardwareProbe`] is the seam between profile derivation and the host.
//! [`SystemProbe`] reads the real machine through `sysinfo`, `nvidia-smi`
//! and the power-supply class; tests supply their own implementations.

use std::io;
use std::path::Path;
use std::process::Command;

use sysinfo::System;
use thiserror::Error;

use super::hardware::{GpuInfo, OsFamily};

/// Failure while probing a piece of hardware.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("hardware probing is not supported on this platform")]
    Unsupported,

    #[error("host probe failed: {0}")]
    Host(String),

    #[error("GPU probe failed: {0}")]
    Gpu(String),

    #[error("probe I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Source of raw hardware facts.
///
/// Memory and CPU counts are required. Everything else has a default that
/// reports the capability as absent, so a probe for a constrained
/// environment only implements what it can actually see.
pub trait HardwareProbe: Send + Sync {
    fn total_memory_bytes(&self) -> Result<u64, ProbeError>;

    fn physical_cores(&self) -> Result<usize, ProbeError>;

    fn logical_cores(&self) -> Result<usize, ProbeError>;

    fn cpu_frequency_mhz(&self) -> Result<f64, ProbeError> {
        Ok(0.0)
    }

    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }

    /// `Ok(None)` means "no GPU found", not an error.
    fn gpu(&self) -> Result<Option<GpuInfo>, ProbeError> {
        Ok(None)
    }

    fn is_laptop(&self) -> Result<bool, ProbeError> {
        Ok(false)
    }
}

/// Probe backed by the running host.
///
/// Memory and CPU facts are sampled once in [`SystemProbe::new`]; the GPU
/// and battery checks run on demand.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    total_memory: u64,
    physical_cores: Option<usize>,
    logical_cores: usize,
    cpu_frequency_mhz: u64,
    os_name: Option<String>,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();

        let logical_cores = match sys.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };

        Self {
            total_memory: sys.total_memory(),
            physical_cores: sys.physical_core_count(),
            logical_cores,
            cpu_frequency_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
            os_name: System::name(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProbe for SystemProbe {
    fn total_memory_bytes(&self) -> Result<u64, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::Unsupported);
        }
        Ok(self.total_memory)
    }

    fn physical_cores(&self) -> Result<usize, ProbeError> {
        // Some virtualized hosts hide the topology; count one core then.
        Ok(self.physical_cores.unwrap_or(1))
    }

    fn logical_cores(&self) -> Result<usize, ProbeError> {
        Ok(self.logical_cores)
    }

    fn cpu_frequency_mhz(&self) -> Result<f64, ProbeError> {
        Ok(self.cpu_frequency_mhz as f64)
    }

    fn os_family(&self) -> OsFamily {
        match &self.os_name {
            Some(name) if !name.is_empty() => {
                // sysinfo reports distribution names on Linux ("Ubuntu", "Arch Linux").
                match OsFamily::current() {
                    OsFamily::Linux => OsFamily::Linux,
                    _ => OsFamily::from_os_name(name),
                }
            }
            _ => OsFamily::current(),
        }
    }

    fn gpu(&self) -> Result<Option<GpuInfo>, ProbeError> {
        query_nvidia_smi()
    }

    fn is_laptop(&self) -> Result<bool, ProbeError> {
        if cfg!(target_os = "linux") {
            has_battery_in(Path::new("/sys/class/power_supply"))
        } else {
            Ok(false)
        }
    }
}

const NVIDIA_SMI_QUERY: &str =
    "--query-gpu=name,memory.total,memory.free,driver_version,temperature.gpu";

/// Ask `nvidia-smi` about the first GPU.
///
/// A missing binary means no NVIDIA GPU and is not an error.
fn query_nvidia_smi() -> Result<Option<GpuInfo>, ProbeError> {
    let output = match Command::new("nvidia-smi")
        .arg(NVIDIA_SMI_QUERY)
        .arg("--format=csv,noheader,nounits")
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ProbeError::Io(e)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::Gpu(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => parse_nvidia_smi_line(line).map(Some),
        None => Ok(None),
    }
}

/// Parse one CSV line of the `nvidia-smi` query above.
///
/// `NVIDIA GeForce RTX 3080, 10240, 9800, 535.104.05, 45`
pub(crate) fn parse_nvidia_smi_line(line: &str) -> Result<GpuInfo, ProbeError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 3 || fields[0].is_empty() {
        return Err(ProbeError::Gpu(format!("unexpected nvidia-smi output: '{}'", line)));
    }

    let parse_mb = |value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| ProbeError::Gpu(format!("invalid memory value '{}'", value)))
    };

    Ok(GpuInfo {
        name: fields[0].to_string(),
        memory_total_mb: parse_mb(fields[1])?,
        memory_free_mb: parse_mb(fields[2])?,
        driver: fields
            .get(3)
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string()),
        temperature_c: fields.get(4).and_then(|t| t.parse().ok()),
    })
}

/// Whether `power_supply_dir` lists a battery (`BAT0`, `BAT1`, ...).
///
/// A missing directory is a machine without a power-supply class, so desktop.
pub(crate) fn has_battery_in(power_supply_dir: &Path) -> Result<bool, ProbeError> {
    let entries = match std::fs::read_dir(power_supply_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ProbeError::Io(e)),
    };

    for entry in entries {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("BAT") {
            return Ok(true);
        }
    }
    Ok(false)
}
