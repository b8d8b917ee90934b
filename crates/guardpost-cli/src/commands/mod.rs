//! CLI command definitions and dispatch.

pub mod inspect;
pub mod keygen;

use clap::{Parser, Subcommand};

use guardpost_core::config::AppConfig;
use guardpost_core::error::AppError;

/// Guardpost: token lifecycle and guard dispatch for multi-surface APIs
#[derive(Debug, Parser)]
#[command(name = "guardpost", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate new signing key material
    Keygen(keygen::KeygenArgs),
    /// Verify a token against the configured keys and print its claims
    Inspect(inspect::InspectArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Keygen(args) => keygen::execute(args),
            Commands::Inspect(args) => inspect::execute(args, &self.config),
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let path = config_path.trim_end_matches(".toml");
    AppConfig::load_file(path)
}
