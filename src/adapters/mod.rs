//! Storage backends for resolved watermarks.
//!
//! - [`database`] - transaction traits, retrying executor, factory
//! - [`postgresql`] - PostgreSQL / CockroachDB implementation
//! - [`memory`] - in-memory implementation for tests and dry runs
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with the in-memory backend:
//!
//! ```rust
//! use cdc_resolved::adapters::database::TransactionExecutor;
//! use cdc_resolved::adapters::memory::MemoryStorage;
//! use cdc_resolved::config::RetryConfig;
//! use std::sync::Arc;
//!
//! let executor = TransactionExecutor::new(Arc::new(MemoryStorage::new()), RetryConfig::default());
//! assert_eq!(executor.storage().backend_name(), "memory");
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
