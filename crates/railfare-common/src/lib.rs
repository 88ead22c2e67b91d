//! Railfare Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, configuration, logging and error handling for the railfare
//! workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`RailfareError`] and the [`Result`] alias
//! - **Configuration**: [`config::PipelineConfig`], the destination folder and route list
//! - **Logging**: [`logging::init_logging`] on top of `tracing`
//! - **Routes**: [`route::Route`] and the derived [`route::TableName`]
//! - **Types**: the fixed column contract and [`types::BatchReport`]
//!
//! # Example
//!
//! ```no_run
//! use railfare_common::config::PipelineConfig;
//!
//! fn main() -> railfare_common::Result<()> {
//!     let config = PipelineConfig::load()?;
//!     for route in config.routes()? {
//!         println!("{} -> {}", route, route.table_name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod route;
pub mod types;

// Re-export commonly used types
pub use error::{RailfareError, Result};
pub use route::{Route, TableName};
pub use types::{BatchReport, FLAT_ROW_COLUMNS};
