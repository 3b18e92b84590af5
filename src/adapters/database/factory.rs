//! Storage factory
//!
//! This module provides factory functions to create storage backends and
//! transaction executors based on configuration.

use crate::adapters::database::executor::TransactionExecutor;
use crate::adapters::database::traits::TransactionalStorage;
use crate::adapters::memory::MemoryStorage;
use crate::adapters::postgresql::adapter::PostgreSQLStorage;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, ResolvedConfig};
use crate::domain::{ResolvedError, Result};
use std::sync::Arc;

/// Create a storage backend based on the configuration
///
/// # Errors
///
/// Returns an error if the selected backend has no configuration section or
/// its client cannot be created.
pub fn create_storage(config: &ResolvedConfig) -> Result<Arc<dyn TransactionalStorage>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ResolvedError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL storage");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            Ok(Arc::new(PostgreSQLStorage::new(client)))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory storage; watermarks will not survive a restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

/// Create a retrying transaction executor over the configured backend
pub fn create_executor(config: &ResolvedConfig) -> Result<TransactionExecutor> {
    let storage = create_storage(config)?;
    Ok(TransactionExecutor::new(storage, config.retry.clone()))
}
