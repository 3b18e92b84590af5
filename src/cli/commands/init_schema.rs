//! Init-schema command implementation
//!
//! Creates the resolved table if it does not exist. The schema itself must
//! already exist.

use super::{exit_code_for, open_manager, EXIT_OK};
use clap::Args;

/// Arguments for the init-schema command
#[derive(Args, Debug)]
pub struct InitSchemaArgs {}

impl InitSchemaArgs {
    /// Execute the init-schema command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let manager = match open_manager(config_path).await {
            Ok(m) => m,
            Err(code) => return Ok(code),
        };

        let table = manager.fully_qualified_table_name();
        tracing::info!(table = %table, "Initializing resolved table");

        match manager.ensure_schema().await {
            Ok(()) => {
                println!("✅ Resolved table ready: {table}");
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to create resolved table {table}");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
