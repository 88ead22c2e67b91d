//! `railfare transform` command implementation
//!
//! Selects raw dumps by date or by missing output and writes their tables.

use crate::commands::print_report;
use crate::error::Result;
use chrono::NaiveDate;
use railfare_common::config::PipelineConfig;
use railfare_common::BatchReport;
use railfare_ingest::catalog::FileCatalog;
use railfare_ingest::transform::transform_files;

pub fn run(
    config: &PipelineConfig,
    since: Option<NaiveDate>,
    unpaired: bool,
) -> Result<BatchReport> {
    let routes = config.routes()?;
    let catalog = FileCatalog::from_config(config);

    let files = if unpaired {
        catalog.files_unpaired(&routes)
    } else {
        catalog.files_since(&routes, catalog.raw_extension(), since)
    };

    let report = transform_files(&files, catalog.tabular_extension());
    print_report("transform", &report);
    Ok(report)
}
