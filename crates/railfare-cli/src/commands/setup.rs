//! `railfare setup` command implementation
//!
//! Safe to re-run: every object is created only when missing, except the
//! trigger (reinstalled) and, with `--recreate-views`, the views.

use crate::commands::print_report;
use crate::error::Result;
use railfare_common::config::PipelineConfig;
use railfare_common::BatchReport;
use railfare_store::{create_pool, health_check, setup_routes, DbConfig, SchemaManager};

pub async fn run(config: &PipelineConfig, recreate_views: bool) -> Result<BatchReport> {
    let routes = config.routes()?;
    let pool = create_pool(&DbConfig::from_env()?).await?;
    health_check(&pool).await?;

    let report = setup_routes(&SchemaManager::new(pool.clone()), &routes, recreate_views).await?;
    pool.close().await;

    print_report("setup", &report);
    Ok(report)
}
