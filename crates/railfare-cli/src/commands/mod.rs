//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod load;
pub mod setup;
pub mod transform;

use crate::error::Result;
use colored::Colorize;
use railfare_common::config::PipelineConfig;
use railfare_common::BatchReport;
use std::path::PathBuf;

/// Pipeline configuration from the environment, with the `--data-dir` override applied
pub fn load_config(data_dir: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load()?;
    if let Some(dir) = data_dir {
        config.destination_folder = dir;
    }
    Ok(config)
}

/// Print a batch summary followed by each failed item
pub fn print_report(action: &str, report: &BatchReport) {
    let mark = if report.is_success() {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("{} {}: {}", mark, action, report);

    for failed in &report.failed {
        println!("  {} {}", failed.item.yellow(), failed.reason);
    }
}
