//! Status command implementation
//!
//! Shows the stored resolved watermark of one endpoint, or of all of them.

use super::{exit_code_for, open_manager, EXIT_OK};
use crate::core::resolved::ResolvedWatermark;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show only this endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print watermarks as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking resolved watermarks");

        let manager = match open_manager(config_path).await {
            Ok(m) => m,
            Err(code) => return Ok(code),
        };

        let loaded = match self.endpoint {
            Some(ref endpoint) => manager.load(endpoint).await.map(|w| vec![w]),
            None => manager.list_all().await,
        };

        let watermarks = match loaded {
            Ok(w) => w,
            Err(e) => {
                println!("❌ Failed to load watermarks");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&watermarks)?);
            return Ok(EXIT_OK);
        }

        println!("📊 Resolved watermarks in {}", manager.fully_qualified_table_name());
        println!();

        if watermarks.is_empty() {
            println!("No resolved timestamps recorded yet.");
            return Ok(EXIT_OK);
        }

        println!(
            "{:<30} {:<32} {:<30}",
            "Endpoint", "Resolved", "Wall Time (UTC)"
        );
        println!("{}", "-".repeat(92));
        for watermark in &watermarks {
            println!("{}", format_row(watermark));
        }
        println!();

        Ok(EXIT_OK)
    }
}

fn format_row(watermark: &ResolvedWatermark) -> String {
    let wall_time = watermark
        .wall_time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.9f").to_string())
        .unwrap_or_else(|| "Never".to_string());

    format!(
        "{:<30} {:<32} {:<30}",
        watermark.endpoint,
        watermark.timestamp().to_string(),
        wall_time
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        let row = format_row(&ResolvedWatermark::new("orders", 1586020760120222000, 3));
        assert!(row.starts_with("orders"));
        assert!(row.contains("1586020760120222000.0000000003"));
        assert!(row.contains("2020-04-04 17:19:20.120222000"));
    }

    #[test]
    fn test_format_row_zero() {
        let row = format_row(&ResolvedWatermark::zero("orders"));
        assert!(row.contains("0.0000000000"));
        assert!(row.contains("Never"));
    }
}
