//! Core logic for cdc-resolved.
//!
//! # Modules
//!
//! - [`resolved`] - resolved timestamp parsing and the per-endpoint watermark store
//! - [`state`] - checkpoint manager running store operations in retried transactions
//!
//! # Ingestion Workflow
//!
//! 1. **Resume**: load the last durable watermark for the endpoint
//! 2. **Receive**: a resolved message arrives from the change-feed
//! 3. **Parse**: decode it into a validated watermark (rejects are logged)
//! 4. **Checkpoint**: upsert the watermark in a serializable transaction
//!
//! # Example
//!
//! ```rust
//! use cdc_resolved::adapters::database::TransactionExecutor;
//! use cdc_resolved::adapters::memory::MemoryStorage;
//! use cdc_resolved::config::RetryConfig;
//! use cdc_resolved::core::resolved::WatermarkStore;
//! use cdc_resolved::core::state::CheckpointManager;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = TransactionExecutor::new(Arc::new(MemoryStorage::new()), RetryConfig::default());
//! let manager = CheckpointManager::new(Arc::new(executor), WatermarkStore::default());
//! manager.ensure_schema().await?;
//!
//! let resume_from = manager.load("orders").await?;
//! assert!(resume_from.is_zero());
//!
//! manager
//!     .record_payload("orders", br#"{"resolved": "1586020760120222000.0000000000"}"#)
//!     .await?;
//! assert_eq!(manager.load("orders").await?.nanos, 1586020760120222000);
//! # Ok(())
//! # }
//! ```

pub mod resolved;
pub mod state;
