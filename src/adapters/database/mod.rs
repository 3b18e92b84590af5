//! Database abstraction layer
//!
//! This module provides the trait-based transaction abstraction and the
//! retrying executor, allowing the watermark store to run against different
//! backends (PostgreSQL/CockroachDB, in-memory).

pub mod executor;
pub mod factory;
pub mod traits;

pub use executor::{TransactionExecutor, TxFuture};
pub use factory::{create_executor, create_storage};
pub use traits::{TransactionalStorage, WatermarkTransaction};
