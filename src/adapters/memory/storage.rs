//! In-memory transactional storage
//!
//! A transaction holds the storage lock from `begin` until it ends, so
//! transactions are serializable by construction. Writes are staged on a copy
//! and only published on commit.

use crate::adapters::database::traits::{TransactionalStorage, WatermarkTransaction};
use crate::core::resolved::table::TableName;
use crate::core::resolved::timestamp::HlcTimestamp;
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::{ResolvedError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Rows = BTreeMap<String, HlcTimestamp>;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Tables keyed by fully qualified name
    tables: HashMap<String, Rows>,
}

impl MemoryState {
    fn rows(&self, table: &TableName) -> Result<&Rows> {
        self.tables.get(&table.fully_qualified()).ok_or_else(|| missing_relation(table))
    }

    fn rows_mut(&mut self, table: &TableName) -> Result<&mut Rows> {
        self.tables
            .get_mut(&table.fully_qualified())
            .ok_or_else(|| missing_relation(table))
    }
}

fn missing_relation(table: &TableName) -> ResolvedError {
    ResolvedError::Database(format!("relation \"{table}\" does not exist"))
}

/// In-memory implementation of [`TransactionalStorage`]
///
/// Used by the test suite and by `database_target = "memory"` for dry runs.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
    injected_conflicts: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` commits fail with a serialization conflict
    pub fn inject_commit_conflicts(&self, count: usize) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    fn take_injected_conflict(&self) -> bool {
        take_one(&self.injected_conflicts)
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl TransactionalStorage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn WatermarkTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            staged,
            storage: self.clone(),
        }))
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Transaction over [`MemoryStorage`]
pub struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    staged: MemoryState,
    storage: MemoryStorage,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> Result<()> {
        if self.guard.is_some() {
            Ok(())
        } else {
            Err(ResolvedError::Other(
                "transaction has already been committed or rolled back".to_string(),
            ))
        }
    }
}

#[async_trait]
impl WatermarkTransaction for MemoryTransaction {
    async fn create_resolved_table(&mut self, table: &TableName) -> Result<()> {
        self.ensure_open()?;
        self.staged.tables.entry(table.fully_qualified()).or_default();
        Ok(())
    }

    async fn select_resolved(
        &mut self,
        table: &TableName,
        endpoint: &str,
    ) -> Result<Option<HlcTimestamp>> {
        self.ensure_open()?;
        Ok(self.staged.rows(table)?.get(endpoint).copied())
    }

    async fn upsert_resolved(
        &mut self,
        table: &TableName,
        watermark: &ResolvedWatermark,
    ) -> Result<()> {
        self.ensure_open()?;
        self.staged
            .rows_mut(table)?
            .insert(watermark.endpoint.clone(), watermark.timestamp());
        Ok(())
    }

    async fn select_all_resolved(&mut self, table: &TableName) -> Result<Vec<ResolvedWatermark>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .rows(table)?
            .iter()
            .map(|(endpoint, ts)| ResolvedWatermark::from_timestamp(endpoint.clone(), *ts))
            .collect())
    }

    async fn count_resolved(&mut self, table: &TableName) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.staged.rows(table)?.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        let Some(mut guard) = self.guard.take() else {
            return Ok(());
        };

        if self.storage.take_injected_conflict() {
            return Err(ResolvedError::SerializationConflict(
                "restart transaction: injected commit conflict".to_string(),
            ));
        }

        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.guard = None;
        self.staged = MemoryState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let storage = MemoryStorage::new();
        let table = TableName::default();

        let mut setup = storage.begin().await.unwrap();
        setup.create_resolved_table(&table).await.unwrap();
        setup.commit().await.unwrap();

        let mut tx = storage.begin().await.unwrap();
        tx.upsert_resolved(&table, &ResolvedWatermark::new("one", 1, 1))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut check = storage.begin().await.unwrap();
        assert_eq!(check.select_resolved(&table, "one").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let storage = MemoryStorage::new();
        let table = TableName::default();

        {
            let mut tx = storage.begin().await.unwrap();
            tx.create_resolved_table(&table).await.unwrap();
        }

        let mut check = storage.begin().await.unwrap();
        assert!(matches!(
            check.count_resolved(&table).await,
            Err(ResolvedError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_finished_transaction_rejects_statements() {
        let storage = MemoryStorage::new();
        let mut tx = storage.begin().await.unwrap();
        tx.commit().await.unwrap();

        assert!(tx.create_resolved_table(&TableName::default()).await.is_err());
        assert!(tx.commit().await.is_err());
    }

    #[tokio::test]
    async fn test_injected_conflict_discards_writes() {
        let storage = MemoryStorage::new();
        storage.inject_commit_conflicts(1);

        let mut tx = storage.begin().await.unwrap();
        tx.create_resolved_table(&TableName::default()).await.unwrap();
        let err = tx.commit().await.unwrap_err();
        assert!(err.is_retryable());

        let mut tx = storage.begin().await.unwrap();
        tx.create_resolved_table(&TableName::default()).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[test]
    fn test_take_one_stops_at_zero() {
        let counter = AtomicUsize::new(1);
        assert!(take_one(&counter));
        assert!(!take_one(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
