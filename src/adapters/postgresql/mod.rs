//! PostgreSQL database integration
//!
//! This module stores resolved watermarks in PostgreSQL or CockroachDB.

pub mod adapter;
pub mod client;

pub use adapter::{PostgreSQLStorage, PostgreSQLTransaction};
pub use client::PostgreSQLClient;
