//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use cdc_resolved::logging::init_logging;
//! use cdc_resolved::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(endpoint = "orders", "Resuming change-feed");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a watermark that was durably written
///
/// # Example
///
/// ```no_run
/// use cdc_resolved::log_watermark_advanced;
/// use cdc_resolved::core::resolved::ResolvedWatermark;
///
/// let watermark = ResolvedWatermark::new("orders", 1586020760120222000, 0);
/// log_watermark_advanced!(&watermark);
/// ```
#[macro_export]
macro_rules! log_watermark_advanced {
    ($watermark:expr) => {
        tracing::info!(
            endpoint = %$watermark.endpoint,
            nanos = $watermark.nanos,
            logical = $watermark.logical,
            "Resolved watermark stored"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use cdc_resolved::log_retry_attempt;
///
/// log_retry_attempt!(2, 10, "restart transaction");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying transaction"
        );
    };
}
