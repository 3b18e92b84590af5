//! Record command implementation
//!
//! Parses one resolved payload and checkpoints it for an endpoint. The
//! payload comes from `--payload`, `--file`, or stdin, in that order.

use super::{exit_code_for, open_manager, EXIT_FATAL, EXIT_OK};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Arguments for the record command
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Endpoint (change-feed stream) the payload belongs to
    #[arg(short, long)]
    pub endpoint: String,

    /// Resolved payload, e.g. '{"resolved": "1586020760120222000.0000000000"}'
    #[arg(long, conflicts_with = "file")]
    pub payload: Option<String>,

    /// Read the payload from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl RecordArgs {
    /// Execute the record command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let payload = match self.read_payload().await {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Failed to read payload");
                println!("   Error: {e:#}");
                return Ok(EXIT_FATAL);
            }
        };

        let manager = match open_manager(config_path).await {
            Ok(m) => m,
            Err(code) => return Ok(code),
        };

        match manager.record_payload(&self.endpoint, &payload).await {
            Ok(watermark) => {
                println!(
                    "✅ Recorded {} for endpoint '{}'",
                    watermark.timestamp(),
                    watermark.endpoint
                );
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to record resolved timestamp");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    async fn read_payload(&self) -> anyhow::Result<Vec<u8>> {
        if let Some(ref payload) = self.payload {
            return Ok(payload.clone().into_bytes());
        }

        if let Some(ref path) = self.file {
            return tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()));
        }

        let mut buffer = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buffer)
            .await
            .context("reading stdin")?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::EXIT_INVALID_PAYLOAD;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn memory_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"database_target = \"memory\"\n").unwrap();
        file.flush().unwrap();
        file
    }

    fn inline(payload: &str) -> RecordArgs {
        RecordArgs {
            endpoint: "orders".to_string(),
            payload: Some(payload.to_string()),
            file: None,
        }
    }

    #[tokio::test]
    async fn test_record_valid_payload_on_memory_backend() {
        let config = memory_config();
        let code = inline(r#"{"resolved": "1586020760120222000.0000000000"}"#)
            .execute(&config.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_record_invalid_payload_exit_code() {
        let config = memory_config();
        let code = inline(r#"{"resolved": "0.0000000000"}"#)
            .execute(&config.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_INVALID_PAYLOAD);
    }

    #[tokio::test]
    async fn test_read_payload_prefers_inline() {
        let args = RecordArgs {
            endpoint: "orders".to_string(),
            payload: Some(r#"{"resolved": "1.0000000000"}"#.to_string()),
            file: None,
        };
        assert_eq!(
            args.read_payload().await.unwrap(),
            br#"{"resolved": "1.0000000000"}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn test_read_payload_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"resolved": "2.0000000000"}"#).unwrap();
        file.flush().unwrap();

        let args = RecordArgs {
            endpoint: "orders".to_string(),
            payload: None,
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(
            args.read_payload().await.unwrap(),
            br#"{"resolved": "2.0000000000"}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn test_read_payload_missing_file() {
        let args = RecordArgs {
            endpoint: "orders".to_string(),
            payload: None,
            file: Some(PathBuf::from("/nonexistent/resolved.json")),
        };
        assert!(args.read_payload().await.is_err());
    }
}
