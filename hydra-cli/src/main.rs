//! Hydra CLI - inspect the host's resource profile and manage configuration.

mod commands;
mod error;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "hydra")]
#[command(version = hydra::VERSION)]
#[command(about = "Hardware-adaptive market-data infrastructure", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect hardware and show the derived resource configuration
    System {
        /// Print the configuration as JSON
        #[arg(long)]
        json: bool,

        /// Initialize logging from config.ini and log the startup banner
        #[arg(long, conflicts_with = "json")]
        log: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::System { json, log } => commands::system::run(json, log),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
