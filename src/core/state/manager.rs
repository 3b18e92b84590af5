//! Checkpoint manager for resolved watermarks
//!
//! This module provides the `CheckpointManager`, which runs each watermark
//! store operation in its own retried transaction.

use crate::adapters::database::executor::TransactionExecutor;
use crate::core::resolved::parser::parse_resolved_line;
use crate::core::resolved::store::WatermarkStore;
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::Result;
use std::sync::Arc;

/// Checkpoint manager for resolved watermarks
///
/// Cheap to clone; clones share the executor and its connection pool.
#[derive(Clone)]
pub struct CheckpointManager {
    executor: Arc<TransactionExecutor>,
    store: WatermarkStore,
}

impl CheckpointManager {
    /// Create a new CheckpointManager
    ///
    /// # Arguments
    ///
    /// * `executor` - Transaction executor for the storage backend
    /// * `store` - Watermark store describing the table and write policy
    pub fn new(executor: Arc<TransactionExecutor>, store: WatermarkStore) -> Self {
        Self { executor, store }
    }

    pub fn store(&self) -> &WatermarkStore {
        &self.store
    }

    pub fn executor(&self) -> &Arc<TransactionExecutor> {
        &self.executor
    }

    pub fn fully_qualified_table_name(&self) -> String {
        self.store.fully_qualified_table_name()
    }

    /// Create the resolved table if it does not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let store = self.store.clone();
        self.executor
            .run_in_transaction(move |tx| {
                let store = store.clone();
                Box::pin(async move { store.ensure_schema(tx).await })
            })
            .await
    }

    /// Load the last durable watermark for an endpoint
    ///
    /// Returns the zero watermark if the endpoint was never checkpointed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails after retries.
    pub async fn load(&self, endpoint: &str) -> Result<ResolvedWatermark> {
        let store = self.store.clone();
        let endpoint = endpoint.to_string();
        self.executor
            .run_in_transaction(move |tx| {
                let store = store.clone();
                let endpoint = endpoint.clone();
                Box::pin(async move { store.read_latest(tx, &endpoint).await })
            })
            .await
    }

    /// Save a watermark
    ///
    /// Uses upsert to create or update the endpoint's row atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails after retries, or if the store's
    /// write policy refuses the value.
    pub async fn save(&self, watermark: &ResolvedWatermark) -> Result<()> {
        let store = self.store.clone();
        let watermark = watermark.clone();
        self.executor
            .run_in_transaction(move |tx| {
                let store = store.clone();
                let watermark = watermark.clone();
                Box::pin(async move { store.write_latest(tx, &watermark).await })
            })
            .await
    }

    /// Parse a resolved payload for `endpoint` and checkpoint it
    ///
    /// Rejected payloads are logged and returned as
    /// [`ResolvedError::Parse`](crate::domain::ResolvedError::Parse); nothing is
    /// written for them.
    pub async fn record_payload(&self, endpoint: &str, payload: &[u8]) -> Result<ResolvedWatermark> {
        let watermark = match parse_resolved_line(payload, endpoint) {
            Ok(watermark) => watermark,
            Err(e) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Rejected resolved payload"
                );
                return Err(e.into());
            }
        };

        self.save(&watermark).await?;
        Ok(watermark)
    }

    /// Get all watermarks, ordered by endpoint
    pub async fn list_all(&self) -> Result<Vec<ResolvedWatermark>> {
        let store = self.store.clone();
        self.executor
            .run_in_transaction(move |tx| {
                let store = store.clone();
                Box::pin(async move { store.list_all(tx).await })
            })
            .await
    }

    /// Number of endpoints with a stored watermark
    pub async fn row_count(&self) -> Result<u64> {
        let store = self.store.clone();
        self.executor
            .run_in_transaction(move |tx| {
                let store = store.clone();
                Box::pin(async move { store.row_count(tx).await })
            })
            .await
    }
}
