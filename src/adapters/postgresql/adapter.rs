//! PostgreSQL adapter implementing database traits
//!
//! This module provides the implementation of `TransactionalStorage` and
//! `WatermarkTransaction` for PostgreSQL and CockroachDB.

use crate::adapters::database::traits::{TransactionalStorage, WatermarkTransaction};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::core::resolved::table::TableName;
use crate::core::resolved::timestamp::HlcTimestamp;
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::{ResolvedError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

/// PostgreSQL implementation of [`TransactionalStorage`]
pub struct PostgreSQLStorage {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLStorage {
    /// Create a new PostgreSQL storage
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl TransactionalStorage for PostgreSQLStorage {
    async fn begin(&self) -> Result<Box<dyn WatermarkTransaction>> {
        let conn = self.client.get_connection().await?;
        conn.batch_execute("BEGIN ISOLATION LEVEL SERIALIZABLE").await?;

        // From here on, dropping the transaction rolls it back
        let tx = PostgreSQLTransaction { conn: Some(conn) };
        tx.conn()?
            .batch_execute(&format!(
                "SET LOCAL statement_timeout = {}",
                self.client.statement_timeout_ms()
            ))
            .await?;

        Ok(Box::new(tx))
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}

/// An open transaction on a pooled connection
///
/// The connection goes back to the pool once the transaction ends. Dropping
/// an unfinished transaction rolls it back in the background. A connection
/// whose transaction state is unknown is detached from the pool and closed
/// instead of being reused.
pub struct PostgreSQLTransaction {
    conn: Option<deadpool_postgres::Object>,
}

impl PostgreSQLTransaction {
    fn conn(&self) -> Result<&deadpool_postgres::Object> {
        self.conn.as_ref().ok_or_else(|| {
            ResolvedError::Other("transaction has already been committed or rolled back".to_string())
        })
    }

    async fn finish(&mut self, statement: &str) -> Result<()> {
        let conn = self.conn.take().ok_or_else(|| {
            ResolvedError::Other("transaction has already been committed or rolled back".to_string())
        })?;
        let outcome = conn.batch_execute(statement).await;
        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                if statement == COMMIT {
                    roll_back_or_detach(conn).await;
                } else {
                    detach(conn);
                }
                Err(e.into())
            }
        }
    }
}

const COMMIT: &str = "COMMIT";
const ROLLBACK: &str = "ROLLBACK";

/// Roll back `conn`, closing it if that fails
async fn roll_back_or_detach(conn: deadpool_postgres::Object) {
    if let Err(e) = conn.batch_execute(ROLLBACK).await {
        tracing::warn!(error = %e, "Failed to roll back transaction; discarding connection");
        detach(conn);
    }
}

/// Remove `conn` from the pool; the connection closes when dropped
fn detach(conn: deadpool_postgres::Object) {
    drop(deadpool_postgres::Object::take(conn));
}

impl Drop for PostgreSQLTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(roll_back_or_detach(conn));
                }
                Err(_) => detach(conn),
            }
        }
    }
}

fn row_to_watermark(row: &Row) -> Result<ResolvedWatermark> {
    let endpoint: String = row.try_get("endpoint")?;
    let timestamp = row_to_timestamp(row)?;
    Ok(ResolvedWatermark::from_timestamp(endpoint, timestamp))
}

fn row_to_timestamp(row: &Row) -> Result<HlcTimestamp> {
    let nanos: i64 = row.try_get("nanos")?;
    let logical: i64 = row.try_get("logical")?;
    let logical = u64::try_from(logical).map_err(|_| {
        ResolvedError::Database(format!("stored logical component {logical} is negative"))
    })?;
    Ok(HlcTimestamp::new(nanos, logical))
}

#[async_trait]
impl WatermarkTransaction for PostgreSQLTransaction {
    async fn create_resolved_table(&mut self, table: &TableName) -> Result<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                endpoint TEXT PRIMARY KEY,
                nanos BIGINT NOT NULL DEFAULT 0,
                logical BIGINT NOT NULL DEFAULT 0
            )
            "#
        );

        self.conn()?.batch_execute(&ddl).await?;
        Ok(())
    }

    async fn select_resolved(
        &mut self,
        table: &TableName,
        endpoint: &str,
    ) -> Result<Option<HlcTimestamp>> {
        let query = format!("SELECT endpoint, nanos, logical FROM {table} WHERE endpoint = $1");

        let row = self.conn()?.query_opt(query.as_str(), &[&endpoint]).await?;
        row.as_ref().map(row_to_timestamp).transpose()
    }

    async fn upsert_resolved(
        &mut self,
        table: &TableName,
        watermark: &ResolvedWatermark,
    ) -> Result<()> {
        let logical = i64::try_from(watermark.logical).map_err(|_| {
            ResolvedError::Validation(format!(
                "logical component {} does not fit a BIGINT column",
                watermark.logical
            ))
        })?;

        let upsert = format!(
            r#"
            INSERT INTO {table} (endpoint, nanos, logical)
            VALUES ($1, $2, $3)
            ON CONFLICT (endpoint) DO UPDATE SET
                nanos = excluded.nanos,
                logical = excluded.logical
            "#
        );

        self.conn()?
            .execute(upsert.as_str(), &[&watermark.endpoint, &watermark.nanos, &logical])
            .await?;

        Ok(())
    }

    async fn select_all_resolved(&mut self, table: &TableName) -> Result<Vec<ResolvedWatermark>> {
        let query = format!("SELECT endpoint, nanos, logical FROM {table} ORDER BY endpoint");

        let rows = self.conn()?.query(query.as_str(), &[]).await?;
        rows.iter().map(row_to_watermark).collect()
    }

    async fn count_resolved(&mut self, table: &TableName) -> Result<u64> {
        let query = format!("SELECT count(*) FROM {table}");

        let row = self.conn()?.query_one(query.as_str(), &[]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        self.finish(COMMIT).await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finish(ROLLBACK).await
    }
}
