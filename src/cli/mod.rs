//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for cdc-resolved using clap.

pub mod commands;

use crate::config::{load_config, LoggingConfig};
use clap::{Parser, Subcommand};

/// Level used when neither `--log-level` nor a loadable config names one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// cdc-resolved - resolved timestamp checkpoint store
#[derive(Parser, Debug)]
#[command(name = "cdc-resolved")]
#[command(version, about, long_about = None)]
#[command(author = "cdc-resolved Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cdc-resolved.toml", env = "CDC_RESOLVED_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CDC_RESOLVED_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level and logging settings for this run
    ///
    /// `--log-level` wins over `application.log_level`. A config that fails to
    /// load yields console-only defaults; the command reports the error itself.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        match load_config(&self.config) {
            Ok(config) => (
                self.log_level
                    .clone()
                    .unwrap_or(config.application.log_level),
                config.logging,
            ),
            Err(_) => (
                self.log_level
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                LoggingConfig::default(),
            ),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the resolved table if it does not exist
    InitSchema(commands::init_schema::InitSchemaArgs),

    /// Parse a resolved payload and checkpoint it for an endpoint
    Record(commands::record::RecordArgs),

    /// Show stored resolved watermarks
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

impl Commands {
    /// Run the selected command, returning its exit code
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match self {
            Commands::InitSchema(args) => args.execute(config_path).await,
            Commands::Record(args) => args.execute(config_path).await,
            Commands::Status(args) => args.execute(config_path).await,
            Commands::ValidateConfig(args) => args.execute(config_path).await,
        }
    }
}
