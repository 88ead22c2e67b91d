//! Railfare Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The file side of the pipeline: turns raw newline-delimited JSON search dumps
//! into tabular files, one per route and request date.
//!
//! # Stages
//!
//! - [`catalog`]: find dated files per route, by cutoff date or by missing output
//! - [`response`]: parse dump lines, dropping malformed ones
//! - [`flatten`]: expand journeys into fixed-order [`flatten::FlatRow`]s and render CSV
//! - [`writer`]: atomically replace a tabular file
//! - [`transform`]: the batch driver tying the stages together
//!
//! # Example
//!
//! ```no_run
//! use railfare_common::config::PipelineConfig;
//! use railfare_ingest::catalog::FileCatalog;
//! use railfare_ingest::transform;
//!
//! fn main() -> railfare_common::Result<()> {
//!     let config = PipelineConfig::load()?;
//!     let catalog = FileCatalog::from_config(&config);
//!     let files = catalog.files_unpaired(&config.routes()?);
//!     let report = transform::transform_files(&files, catalog.tabular_extension());
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod flatten;
pub mod response;
pub mod transform;
pub mod writer;

pub use catalog::{FileCatalog, SourceFile};
pub use flatten::{flatten, flatten_file, FlatRow, Price};
pub use response::{parse_file, parse_line, LineError, MalformedLine, ParsedFile, RawResponse};
pub use writer::{write_atomic, write_table};
