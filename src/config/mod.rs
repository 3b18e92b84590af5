//! Configuration management for cdc-resolved.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! cdc-resolved uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CDC_RESOLVED_*` environment overrides
//! - Default values for optional settings
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cdc_resolved::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cdc-resolved.toml")?;
//!
//! let table = config.store.table_name()?;
//! println!("Resolved table: {}", table.fully_qualified());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DatabaseTarget`] - Backend selection (`postgresql` or `memory`)
//! - [`PostgreSQLConfig`] - Connection string and pool settings
//! - [`StoreConfig`] - Resolved table name and write policy
//! - [`RetryConfig`] - Serialization-conflict retry and backoff
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [postgresql]
//! connection_string = "${CDC_RESOLVED_DSN}"
//! max_connections = 10
//!
//! [store]
//! schema = "_cdc_sink"
//! table = "resolved"
//! write_policy = "always_overwrite"
//!
//! [retry]
//! max_retries = 10
//! initial_delay_ms = 50
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, DatabaseTarget, LoggingConfig, PostgreSQLConfig, ResolvedConfig,
    RetryConfig, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
