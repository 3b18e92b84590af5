// cdc-resolved - Resolved timestamp checkpoint store
// Copyright (c) 2025 cdc-resolved Contributors
// Licensed under the MIT License

use cdc_resolved::cli::commands::EXIT_FATAL;
use cdc_resolved::cli::Cli;
use cdc_resolved::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (log_level, logging_config) = cli.logging_settings();
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "cdc-resolved - Resolved timestamp checkpoint store"
    );

    let exit_code = match cli.command.execute(&cli.config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}
