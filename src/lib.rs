// cdc-resolved - Resolved timestamp checkpoint store
// Copyright (c) 2025 cdc-resolved Contributors
// Licensed under the MIT License

//! # cdc-resolved - Resolved timestamp checkpoint store
//!
//! cdc-resolved durably records, per change-feed endpoint, the latest
//! *resolved* timestamp: the point below which every upstream change has been
//! fully processed. Consumers read it back on restart to resume without
//! losing or replaying changes.
//!
//! ## Overview
//!
//! This library provides:
//! - **Parsing** resolved payloads (`{"resolved": "<nanos>.<logical>"}`) into
//!   exact hybrid-logical-clock timestamps
//! - **Storing** one watermark row per endpoint with upsert semantics
//! - **Retrying** serializable transactions on conflict
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Timestamp parsing, watermark store, checkpoint manager
//! - [`adapters`] - Storage backends (PostgreSQL / CockroachDB, in-memory)
//! - [`domain`] - Error taxonomy and `Result` alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cdc_resolved::adapters::database::create_executor;
//! use cdc_resolved::config::load_config;
//! use cdc_resolved::core::state::CheckpointManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cdc-resolved.toml")?;
//!     let executor = create_executor(&config)?;
//!     let manager = CheckpointManager::new(Arc::new(executor), config.store.build_store()?);
//!
//!     manager.ensure_schema().await?;
//!     let resume_from = manager.load("orders").await?;
//!     println!("Resuming orders from {}", resume_from.timestamp());
//!
//!     manager
//!         .record_payload("orders", br#"{"resolved": "1586020760120222000.0000000000"}"#)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. Parser rejections are
//! [`domain::ParseError`] values wrapped in [`domain::ResolvedError::Parse`];
//! only [`domain::ResolvedError::SerializationConflict`] is retried.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
