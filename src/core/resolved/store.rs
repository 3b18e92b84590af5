//! Watermark store
//!
//! The store owns the meaning of the resolved table: one row per endpoint,
//! absence reads as the zero watermark, writes replace the row. It never
//! opens, commits or retries a transaction; every operation runs inside the
//! transaction handed in by the caller, so it is always safe to re-run as part
//! of a retried transaction.

use crate::adapters::database::traits::WatermarkTransaction;
use crate::core::resolved::table::TableName;
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::{ResolvedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How [`WatermarkStore::write_latest`] treats the value already stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Replace the stored row unconditionally, regressions included
    #[default]
    AlwaysOverwrite,

    /// Refuse writes that would move the watermark backwards. Rewriting the
    /// current value is accepted as a no-op.
    StrictlyMonotonic,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysOverwrite => write!(f, "always_overwrite"),
            Self::StrictlyMonotonic => write!(f, "strictly_monotonic"),
        }
    }
}

/// Per-endpoint latest-watermark storage
///
/// # Examples
///
/// ```no_run
/// use cdc_resolved::adapters::database::TransactionExecutor;
/// use cdc_resolved::core::resolved::{ResolvedWatermark, WatermarkStore};
///
/// # async fn example(executor: &TransactionExecutor) -> cdc_resolved::domain::Result<()> {
/// let store = WatermarkStore::default();
/// let latest = executor
///     .run_in_transaction(move |tx| {
///         let store = store.clone();
///         Box::pin(async move { store.read_latest(tx, "orders").await })
///     })
///     .await?;
/// println!("resume orders from {}", latest.timestamp());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WatermarkStore {
    table: TableName,
    policy: WritePolicy,
}

impl WatermarkStore {
    pub fn new(table: TableName, policy: WritePolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Canonical `schema.table` name of the backing table
    pub fn fully_qualified_table_name(&self) -> String {
        self.table.fully_qualified()
    }

    /// Create the backing table if absent
    ///
    /// Safe to call any number of times.
    pub async fn ensure_schema(&self, tx: &mut dyn WatermarkTransaction) -> Result<()> {
        tx.create_resolved_table(&self.table).await?;
        tracing::info!(table = %self.table, "Resolved table ensured");
        Ok(())
    }

    /// Read the persisted watermark for `endpoint`
    ///
    /// An endpoint that was never written reads as
    /// [`ResolvedWatermark::zero`], not as an error.
    pub async fn read_latest(
        &self,
        tx: &mut dyn WatermarkTransaction,
        endpoint: &str,
    ) -> Result<ResolvedWatermark> {
        match tx.select_resolved(&self.table, endpoint).await? {
            Some(timestamp) => {
                tracing::debug!(
                    endpoint = %endpoint,
                    nanos = timestamp.nanos,
                    logical = timestamp.logical,
                    "Resolved watermark loaded"
                );
                Ok(ResolvedWatermark::from_timestamp(endpoint, timestamp))
            }
            None => {
                tracing::debug!(endpoint = %endpoint, "No resolved watermark stored yet");
                Ok(ResolvedWatermark::zero(endpoint))
            }
        }
    }

    /// Upsert the row keyed by `watermark.endpoint`
    ///
    /// # Errors
    ///
    /// - [`ResolvedError::Validation`] if the endpoint is empty
    /// - [`ResolvedError::Regression`] if the policy is
    ///   [`WritePolicy::StrictlyMonotonic`] and the stored timestamp is newer
    /// - any storage error, unchanged
    pub async fn write_latest(
        &self,
        tx: &mut dyn WatermarkTransaction,
        watermark: &ResolvedWatermark,
    ) -> Result<()> {
        if watermark.endpoint.is_empty() {
            return Err(ResolvedError::Validation(
                "cannot store a resolved watermark without an endpoint".to_string(),
            ));
        }

        if self.policy == WritePolicy::StrictlyMonotonic {
            if let Some(current) = tx.select_resolved(&self.table, &watermark.endpoint).await? {
                let proposed = watermark.timestamp();
                if proposed < current {
                    tracing::warn!(
                        endpoint = %watermark.endpoint,
                        current = %current,
                        proposed = %proposed,
                        "Refusing resolved timestamp regression"
                    );
                    return Err(ResolvedError::Regression {
                        endpoint: watermark.endpoint.clone(),
                        current,
                        proposed,
                    });
                }
                if proposed == current {
                    tracing::debug!(
                        endpoint = %watermark.endpoint,
                        timestamp = %current,
                        "Resolved timestamp unchanged"
                    );
                    return Ok(());
                }
            }
        }

        tx.upsert_resolved(&self.table, watermark).await?;
        crate::log_watermark_advanced!(watermark);
        Ok(())
    }

    /// Every stored watermark, ordered by endpoint
    pub async fn list_all(&self, tx: &mut dyn WatermarkTransaction) -> Result<Vec<ResolvedWatermark>> {
        tx.select_all_resolved(&self.table).await
    }

    /// Number of rows in the backing table
    pub async fn row_count(&self, tx: &mut dyn WatermarkTransaction) -> Result<u64> {
        tx.count_resolved(&self.table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::traits::TransactionalStorage;
    use crate::adapters::memory::MemoryStorage;
    use crate::core::resolved::timestamp::HlcTimestamp;

    async fn open(storage: &MemoryStorage, store: &WatermarkStore) -> Box<dyn WatermarkTransaction> {
        let mut tx = storage.begin().await.unwrap();
        store.ensure_schema(tx.as_mut()).await.unwrap();
        tx
    }

    #[tokio::test]
    async fn test_read_missing_endpoint_is_zero() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::default();
        let mut tx = open(&storage, &store).await;

        let watermark = store.read_latest(tx.as_mut(), "one").await.unwrap();
        assert_eq!(watermark, ResolvedWatermark::zero("one"));
    }

    #[tokio::test]
    async fn test_read_your_writes_inside_transaction() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::default();
        let mut tx = open(&storage, &store).await;

        let written = ResolvedWatermark::new("one", 5, 5);
        store.write_latest(tx.as_mut(), &written).await.unwrap();
        assert_eq!(store.read_latest(tx.as_mut(), "one").await.unwrap(), written);
        assert_eq!(store.row_count(tx.as_mut()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_always_overwrite_accepts_regression() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::default();
        let mut tx = open(&storage, &store).await;

        store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 9, 0))
            .await
            .unwrap();
        store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 3, 0))
            .await
            .unwrap();

        let latest = store.read_latest(tx.as_mut(), "one").await.unwrap();
        assert_eq!(latest.timestamp(), HlcTimestamp::new(3, 0));
    }

    #[tokio::test]
    async fn test_strictly_monotonic_refuses_regression() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::new(TableName::default(), WritePolicy::StrictlyMonotonic);
        let mut tx = open(&storage, &store).await;

        store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 9, 4))
            .await
            .unwrap();

        let err = store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 9, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolvedError::Regression { .. }));

        // Same value again is a no-op, a later one advances
        store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 9, 4))
            .await
            .unwrap();
        store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("one", 10, 0))
            .await
            .unwrap();

        let latest = store.read_latest(tx.as_mut(), "one").await.unwrap();
        assert_eq!(latest.timestamp(), HlcTimestamp::new(10, 0));
    }

    #[tokio::test]
    async fn test_rejects_empty_endpoint() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::default();
        let mut tx = open(&storage, &store).await;

        let err = store
            .write_latest(tx.as_mut(), &ResolvedWatermark::new("", 1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolvedError::Validation(_)));
        assert_eq!(store.row_count(tx.as_mut()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let storage = MemoryStorage::new();
        let store = WatermarkStore::default();
        let mut tx = open(&storage, &store).await;

        store.ensure_schema(tx.as_mut()).await.unwrap();
        store.ensure_schema(tx.as_mut()).await.unwrap();
    }

    #[test]
    fn test_write_policy_names() {
        assert_eq!(WritePolicy::default(), WritePolicy::AlwaysOverwrite);
        assert_eq!(WritePolicy::StrictlyMonotonic.to_string(), "strictly_monotonic");
    }
}
