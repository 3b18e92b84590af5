//! Structured logging setup using tracing
//!
//! Console output is always on; JSON file output with rotation is added
//! when `logging.local_enabled` is set.

use crate::config::LoggingConfig;
use crate::domain::{ResolvedError, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log file name inside `logging.local_path`
pub const LOG_FILE_NAME: &str = "cdc-resolved.log";

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system based on configuration
///
/// `RUST_LOG`, when set, takes precedence over `log_level_str`.
///
/// # Arguments
///
/// * `log_level_str` - Log level as a string (trace, debug, info, warn, error)
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns [`ResolvedError::Configuration`] for an unknown level or if the
/// log directory cannot be created. Calling this twice in one process fails.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cdc_resolved={log_level}")));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());

    layers.push(console_layer.boxed());

    let file_guard = match file_writer(config)? {
        Some((non_blocking, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(non_blocking)
                .with_filter(env_filter);

            layers.push(file_layer.boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| ResolvedError::Configuration(format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

/// Open the rolling log file when local logging is enabled
///
/// Creates `local_path` if needed. Files are named `cdc-resolved.log.<date>`.
pub(crate) fn file_writer(config: &LoggingConfig) -> Result<Option<(NonBlocking, WorkerGuard)>> {
    if !config.local_enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        ResolvedError::Configuration(format!(
            "Failed to create log directory {}: {}",
            config.local_path, e
        ))
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(parse_rotation(&config.local_rotation))
        .filename_prefix(LOG_FILE_NAME)
        .build(&config.local_path)
        .map_err(|e| {
            ResolvedError::Configuration(format!(
                "Failed to open log file in {}: {}",
                config.local_path, e
            ))
        })?;

    Ok(Some(tracing_appender::non_blocking(file_appender)))
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        _ => Rotation::DAILY,
    }
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ResolvedError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}
