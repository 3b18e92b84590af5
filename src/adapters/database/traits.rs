//! Database abstraction traits
//!
//! This module defines the traits that storage backends must implement to
//! hold resolved watermarks. The SQL (or its in-memory equivalent) lives in
//! the backends; the semantics live in
//! [`WatermarkStore`](crate::core::resolved::WatermarkStore).

use crate::core::resolved::table::TableName;
use crate::core::resolved::timestamp::HlcTimestamp;
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::Result;
use async_trait::async_trait;

/// An open transaction against a storage backend
///
/// Every statement issued through this trait runs inside the same
/// transaction. Exactly one of [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) ends it; any further call fails.
#[async_trait]
pub trait WatermarkTransaction: Send {
    /// Create the resolved table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails for any reason other than the table
    /// already existing.
    async fn create_resolved_table(&mut self, table: &TableName) -> Result<()>;

    /// Select the stored timestamp for `endpoint`
    ///
    /// Returns `Ok(None)` if the endpoint has no row.
    async fn select_resolved(
        &mut self,
        table: &TableName,
        endpoint: &str,
    ) -> Result<Option<HlcTimestamp>>;

    /// Insert or replace the row keyed by `watermark.endpoint`
    async fn upsert_resolved(
        &mut self,
        table: &TableName,
        watermark: &ResolvedWatermark,
    ) -> Result<()>;

    /// Select every row, ordered by endpoint
    async fn select_all_resolved(&mut self, table: &TableName) -> Result<Vec<ResolvedWatermark>>;

    /// Count the rows of the resolved table
    async fn count_resolved(&mut self, table: &TableName) -> Result<u64>;

    /// Commit the transaction
    ///
    /// # Errors
    ///
    /// Returns [`ResolvedError::SerializationConflict`](crate::domain::ResolvedError::SerializationConflict)
    /// if the engine aborted the transaction in favour of a concurrent writer.
    async fn commit(&mut self) -> Result<()>;

    /// Roll the transaction back, discarding every staged write
    async fn rollback(&mut self) -> Result<()>;
}

/// A backend able to open watermark transactions
#[async_trait]
pub trait TransactionalStorage: Send + Sync {
    /// Begin a new serializable transaction
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or `BEGIN` fails.
    async fn begin(&self) -> Result<Box<dyn WatermarkTransaction>>;

    /// Test that the backend is reachable
    async fn test_connection(&self) -> Result<()>;

    /// Short backend name for logs and status output
    fn backend_name(&self) -> &str;
}
