//! `railfare load` command implementation

use crate::commands::print_report;
use crate::error::Result;
use chrono::NaiveDate;
use railfare_common::config::PipelineConfig;
use railfare_common::BatchReport;
use railfare_ingest::catalog::FileCatalog;
use railfare_store::{create_pool, load_files, BulkLoader, DbConfig, LoadTarget};

/// Load tabular files dated on or after `since` into their route tables
pub async fn run(config: &PipelineConfig, since: Option<NaiveDate>) -> Result<BatchReport> {
    let routes = config.routes()?;
    let pool = create_pool(&DbConfig::from_env()?).await?;

    let catalog = FileCatalog::from_config(config);
    let targets: Vec<LoadTarget> = catalog
        .files_since(&routes, catalog.tabular_extension(), since)
        .iter()
        .map(|file| LoadTarget::new(&file.route, &file.path))
        .collect();

    let report = load_files(&BulkLoader::new(pool.clone()), &targets).await;
    pool.close().await;

    print_report("load", &report);
    Ok(report)
}
