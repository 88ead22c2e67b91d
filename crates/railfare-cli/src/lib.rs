//! Railfare CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line front end of the fare pipeline:
//!
//! - **Transform**: turn raw search dumps into tabular files (`railfare transform`)
//! - **Load**: append tabular files to route tables and refresh views (`railfare load`)
//! - **Setup**: install tables, views, the refresh procedure and triggers (`railfare setup`)

pub mod commands;
pub mod error;

pub use error::{CliError, Result};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Railfare - train fare search pipeline
#[derive(Parser, Debug)]
#[command(name = "railfare")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root folder holding one directory per route
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten raw dumps into tabular files
    Transform {
        /// Process raw files dated on or after this day (default: today)
        #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "unpaired")]
        since: Option<NaiveDate>,

        /// Process every raw file that has no tabular output yet
        #[arg(long)]
        unpaired: bool,
    },

    /// Load tabular files into route tables
    Load {
        /// Load tabular files dated on or after this day (default: today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        since: Option<NaiveDate>,
    },

    /// Create route tables, views, triggers and the refresh procedure
    Setup {
        /// Drop and recreate the materialized views
        #[arg(long)]
        recreate_views: bool,
    },
}

impl Commands {
    /// Log file prefix: transform runs and database runs log separately
    pub fn log_file_prefix(&self) -> &'static str {
        match self {
            Commands::Transform { .. } => "processing",
            Commands::Load { .. } | Commands::Setup { .. } => "db",
        }
    }
}
