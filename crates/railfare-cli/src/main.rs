//! Railfare CLI - Main entry point

use clap::Parser;
use railfare_cli::commands::{self, load_config};
use railfare_cli::{Cli, Commands};
use railfare_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        })
        .log_file_prefix(cli.command.log_file_prefix())
        .build();

    // Environment variables take precedence over the defaults above
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI keeps working without file logging, e.g. on a read-only disk
    let guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        },
    };

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        // Flush buffered file logs; process::exit skips destructors
        drop(guard);
        process::exit(1);
    }
}

/// Execute the CLI command; per-file failures are reported, not returned
async fn execute_command(cli: Cli) -> railfare_cli::Result<()> {
    let config = load_config(cli.data_dir)?;
    info!(
        root = %config.destination_folder.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Transform { since, unpaired } => {
            commands::transform::run(&config, since, unpaired)?;
        },
        Commands::Load { since } => {
            commands::load::run(&config, since).await?;
        },
        Commands::Setup { recreate_views } => {
            commands::setup::run(&config, recreate_views).await?;
        },
    }

    Ok(())
}
