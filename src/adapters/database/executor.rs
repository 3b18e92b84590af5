//! Retrying transaction executor
//!
//! [`TransactionExecutor::run_in_transaction`] is the only place that opens,
//! commits and retries transactions. Serializable engines such as CockroachDB
//! abort one side of a conflicting pair with SQLSTATE 40001 and expect the
//! client to re-run the whole transaction; the executor does exactly that,
//! with exponential backoff.

use crate::adapters::database::traits::{TransactionalStorage, WatermarkTransaction};
use crate::config::RetryConfig;
use crate::domain::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Future returned by a unit of work run inside a transaction
pub type TxFuture<'t, T> = BoxFuture<'t, Result<T>>;

/// Runs units of work in transactions, retrying serialization conflicts
#[derive(Clone)]
pub struct TransactionExecutor {
    storage: Arc<dyn TransactionalStorage>,
    retry: RetryConfig,
}

impl TransactionExecutor {
    pub fn new(storage: Arc<dyn TransactionalStorage>, retry: RetryConfig) -> Self {
        Self { storage, retry }
    }

    pub fn storage(&self) -> &Arc<dyn TransactionalStorage> {
        &self.storage
    }

    /// Run `work` in a transaction and commit it
    ///
    /// `work` may be invoked more than once: when it, or the commit, fails with
    /// a retryable error the transaction is rolled back and `work` runs again
    /// in a fresh one, up to `max_retries` times. Any other error rolls the
    /// transaction back and is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cdc_resolved::adapters::database::TransactionExecutor;
    ///
    /// # async fn example(executor: &TransactionExecutor) -> cdc_resolved::domain::Result<()> {
    /// let rows = executor
    ///     .run_in_transaction(|tx| {
    ///         Box::pin(async move {
    ///             let table = cdc_resolved::core::resolved::TableName::default();
    ///             tx.count_resolved(&table).await
    ///         })
    ///     })
    ///     .await?;
    /// println!("{rows} endpoints tracked");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_in_transaction<T, F>(&self, mut work: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnMut(&'t mut dyn WatermarkTransaction) -> TxFuture<'t, T> + Send,
    {
        let mut attempt = 0;

        loop {
            let mut tx = self.storage.begin().await?;

            let outcome = match work(tx.as_mut()).await {
                Ok(value) => tx.commit().await.map(|()| value),
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(
                            error = %rollback_err,
                            backend = self.storage.backend_name(),
                            "Rollback failed"
                        );
                    }
                    Err(e)
                }
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    crate::log_retry_attempt!(attempt, self.retry.max_retries, e.to_string());
                    tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::error!(
                            error = %e,
                            attempts = attempt + 1,
                            "Transaction retries exhausted"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;
    use crate::core::resolved::{ResolvedWatermark, TableName};
    use crate::domain::ResolvedError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_retry(max_retries: usize) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_commit_conflicts_are_retried() {
        let storage = Arc::new(MemoryStorage::new());
        let executor = TransactionExecutor::new(storage.clone(), fast_retry(5));
        let calls = Arc::new(AtomicUsize::new(0));

        storage.inject_commit_conflicts(2);

        let counter = calls.clone();
        executor
            .run_in_transaction(move |tx| {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tx.create_resolved_table(&TableName::default()).await
                })
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let storage = Arc::new(MemoryStorage::new());
        let executor = TransactionExecutor::new(storage.clone(), fast_retry(1));

        storage.inject_commit_conflicts(5);

        let err = executor
            .run_in_transaction(|tx| {
                Box::pin(async move { tx.create_resolved_table(&TableName::default()).await })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ResolvedError::SerializationConflict(_)));
    }

    #[tokio::test]
    async fn test_non_retryable_error_rolls_back() {
        let storage = Arc::new(MemoryStorage::new());
        let executor = TransactionExecutor::new(storage.clone(), fast_retry(5));
        let table = TableName::default();

        let setup = table.clone();
        executor
            .run_in_transaction(move |tx| {
                let table = setup.clone();
                Box::pin(async move { tx.create_resolved_table(&table).await })
            })
            .await
            .unwrap();

        let written = table.clone();
        let err = executor
            .run_in_transaction(move |tx| {
                let table = written.clone();
                Box::pin(async move {
                    tx.upsert_resolved(&table, &ResolvedWatermark::new("one", 5, 5))
                        .await?;
                    Err::<(), _>(ResolvedError::Other("abandon".to_string()))
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ResolvedError::Other(_)));

        let counted = table.clone();
        let rows = executor
            .run_in_transaction(move |tx| {
                let table = counted.clone();
                Box::pin(async move { tx.count_resolved(&table).await })
            })
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
