//! System command - reports detected hardware and the derived resource policy.

use hydra::config::ConfigFile;
use hydra::log::NoOpLogger;
use hydra::logging;
use hydra::system::{
    format_megabytes, BatchPurpose, MemoryPurpose, SystemConfig, SystemProbe,
};

use crate::error::CliError;

/// Run the system command.
pub fn run(json: bool, log: bool) -> Result<(), CliError> {
    if log {
        let settings = ConfigFile::load()?;
        let guard =
            logging::init_from_settings(&settings.logging).map_err(CliError::LoggingInit)?;
        let config = SystemConfig::detect();
        tracing::info!(
            tier = %config.resources.tier,
            log_file = %guard.log_path().display(),
            "System detection complete"
        );
        return Ok(());
    }

    let config = SystemConfig::detect_with(&SystemProbe::new(), &NoOpLogger);

    if json {
        println!("{}", serde_json::to_string_pretty(&config.summary())?);
    } else {
        print_report(&config);
    }
    Ok(())
}

fn print_report(config: &SystemConfig) {
    let hw = &config.hardware;
    let res = &config.resources;

    println!("Hydra System Configuration");
    println!("==========================");
    println!();
    println!("Hardware");
    println!("  RAM:            {} GB", hw.total_ram_gb);
    println!(
        "  CPU:            {} physical / {} logical cores @ {} MHz",
        hw.physical_cores, hw.logical_cores, hw.cpu_frequency_mhz
    );
    match &hw.gpu {
        Some(gpu) => println!("  GPU:            {} ({} MB)", gpu.name, gpu.memory_total_mb),
        None => println!("  GPU:            none"),
    }
    println!("  OS:             {}", hw.os);
    println!("  Laptop:         {}", if hw.is_laptop { "yes" } else { "no" });
    println!();
    println!("Resources ({} tier)", res.tier);
    println!("  Max workers:    {}", res.max_workers);
    for purpose in BatchPurpose::ALL {
        println!("  {:<15} {}", batch_label(purpose), res.batch_sizes.get(purpose));
    }
    for purpose in MemoryPurpose::ALL {
        println!(
            "  {:<15} {}",
            memory_label(purpose),
            format_megabytes(res.memory_limits.get(purpose))
        );
    }
    println!("  GPU accel:      {}", res.use_gpu_acceleration);
    println!();
    println!("Simple mode:      {}", config.should_use_simple_mode());
    println!("ML backend:       {}", config.recommended_ml_backend());
}

fn batch_label(purpose: BatchPurpose) -> &'static str {
    match purpose {
        BatchPurpose::Historical => "Historical:",
        BatchPurpose::Realtime => "Realtime:",
        BatchPurpose::MlTraining => "ML training:",
        BatchPurpose::MlInference => "ML inference:",
    }
}

fn memory_label(purpose: MemoryPurpose) -> &'static str {
    match purpose {
        MemoryPurpose::DataCache => "Data cache:",
        MemoryPurpose::ModelCache => "Model cache:",
        MemoryPurpose::MaxDatasetSize => "Max dataset:",
    }
}
