//! CLI command implementations
//!
//! Commands return a process exit code rather than an error; only truly
//! unexpected failures surface as `anyhow::Error` (exit code 5).

pub mod init_schema;
pub mod record;
pub mod status;
pub mod validate;

use crate::adapters::database::create_executor;
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use crate::core::state::CheckpointManager;
use crate::domain::ResolvedError;
use std::sync::Arc;

/// Success
pub const EXIT_OK: i32 = 0;
/// Configuration could not be loaded or is invalid
pub const EXIT_CONFIG: i32 = 2;
/// Resolved payload was rejected by the parser
pub const EXIT_INVALID_PAYLOAD: i32 = 3;
/// Storage backend unreachable
pub const EXIT_CONNECTION: i32 = 4;
/// Any other failure
pub const EXIT_FATAL: i32 = 5;
/// A strictly monotonic store refused a regression
pub const EXIT_REGRESSION: i32 = 6;

/// Map an error to the exit code reported for it
pub fn exit_code_for(error: &ResolvedError) -> i32 {
    match error {
        ResolvedError::Configuration(_) => EXIT_CONFIG,
        ResolvedError::Parse(_) => EXIT_INVALID_PAYLOAD,
        ResolvedError::Connection(_) => EXIT_CONNECTION,
        ResolvedError::Regression { .. } => EXIT_REGRESSION,
        _ => EXIT_FATAL,
    }
}

/// Load configuration and connect a checkpoint manager
///
/// Failures are reported on stdout; the `Err` value is the exit code.
pub(crate) async fn open_manager(config_path: &str) -> Result<CheckpointManager, i32> {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            println!("❌ Failed to load configuration file");
            println!("   Error: {e}");
            return Err(EXIT_CONFIG);
        }
    };

    let store = match config.store.build_store() {
        Ok(s) => s,
        Err(e) => {
            println!("❌ Invalid store configuration");
            println!("   Error: {e}");
            return Err(EXIT_CONFIG);
        }
    };

    let executor = match create_executor(&config) {
        Ok(x) => x,
        Err(e) => {
            println!("❌ Failed to create storage backend");
            println!("   Error: {e}");
            return Err(exit_code_for(&e));
        }
    };

    if let Err(e) = executor.storage().test_connection().await {
        println!("❌ Failed to connect to database");
        println!("   Error: {e}");
        return Err(EXIT_CONNECTION);
    }

    let manager = CheckpointManager::new(Arc::new(executor), store);

    // Nothing persists between runs in memory, so the table is created up front
    if config.database_target == DatabaseTarget::Memory {
        if let Err(e) = manager.ensure_schema().await {
            println!("❌ Failed to prepare in-memory table");
            println!("   Error: {e}");
            return Err(exit_code_for(&e));
        }
    }

    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolved::HlcTimestamp;
    use crate::domain::ParseError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&ResolvedError::Configuration("bad".to_string())),
            EXIT_CONFIG
        );
        assert_eq!(
            exit_code_for(&ResolvedError::Parse(ParseError::MissingField)),
            EXIT_INVALID_PAYLOAD
        );
        assert_eq!(
            exit_code_for(&ResolvedError::Connection("refused".to_string())),
            EXIT_CONNECTION
        );
        assert_eq!(
            exit_code_for(&ResolvedError::Regression {
                endpoint: "orders".to_string(),
                current: HlcTimestamp::new(2, 0),
                proposed: HlcTimestamp::new(1, 0),
            }),
            EXIT_REGRESSION
        );
        assert_eq!(
            exit_code_for(&ResolvedError::Database("boom".to_string())),
            EXIT_FATAL
        );
    }

    #[tokio::test]
    async fn test_open_manager_missing_config() {
        let result = open_manager("does-not-exist.toml").await;
        assert_eq!(result.err(), Some(EXIT_CONFIG));
    }
}
