//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the cdc-resolved configuration file.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::schema::{DatabaseTarget, PostgreSQLConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Database Target: PostgreSQL");
                    println!("  PostgreSQL Connection: {}", safe_connection(pg_config));
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!(
                        "  Statement Timeout: {}s",
                        pg_config.statement_timeout_seconds
                    );
                }
            }
            DatabaseTarget::Memory => {
                println!("  Database Target: Memory (watermarks are not persisted)");
            }
        }

        println!(
            "  Resolved Table: {}.{}",
            config.store.schema, config.store.table
        );
        println!("  Write Policy: {}", config.store.write_policy);
        println!(
            "  Retries: {} (initial {}ms, max {}ms, x{})",
            config.retry.max_retries,
            config.retry.initial_delay_ms,
            config.retry.max_delay_ms,
            config.retry.backoff_multiplier
        );
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();

        Ok(EXIT_OK)
    }
}

fn safe_connection(pg_config: &PostgreSQLConfig) -> String {
    redact_connection_string(pg_config.connection_string.expose_secret().as_ref())
}
