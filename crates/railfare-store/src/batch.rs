//! Load and setup batch drivers
//!
//! Each item (file or route) is attempted independently; a failure is logged,
//! recorded in the [`BatchReport`], and the batch continues with the next item.

use crate::db::StoreResult;
use crate::loader::BulkLoader;
use crate::schema::SchemaManager;
use railfare_common::{BatchReport, Route, TableName};
use std::path::PathBuf;
use tracing::{error, info};

/// A tabular file and the table it loads into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTarget {
    pub table: TableName,
    pub path: PathBuf,
}

impl LoadTarget {
    pub fn new(route: &Route, path: impl Into<PathBuf>) -> Self {
        Self {
            table: route.table_name().clone(),
            path: path.into(),
        }
    }
}

/// Load every target in order
pub async fn load_files(loader: &BulkLoader, targets: &[LoadTarget]) -> BatchReport {
    for target in targets {
        info!(table = %target.table, "{} planned to be loaded", target.path.display());
    }

    let mut report = BatchReport::new();
    for target in targets {
        let item = target.path.display().to_string();
        match loader.load_rows(&target.table, &target.path).await {
            Ok(stats) => {
                info!(
                    table = %target.table,
                    rows = stats.rows_inserted,
                    "{} has been loaded",
                    item
                );
                report.record_success(item);
            },
            Err(e) => {
                error!(table = %target.table, path = %item, error = %e, "Load rolled back");
                report.record_failure(item, e);
            },
        }
    }

    info!(%report, "Load finished");
    report
}

/// Install the refresh procedure, then table, views and trigger per route
///
/// Fails as a whole only when the shared procedure cannot be installed, since
/// no route is usable without it.
pub async fn setup_routes(
    schema: &SchemaManager,
    routes: &[Route],
    recreate_views: bool,
) -> StoreResult<BatchReport> {
    schema.ensure_refresh_function().await?;

    let mut report = BatchReport::new();
    for route in routes {
        match schema.ensure_route(route, recreate_views).await {
            Ok(()) => report.record_success(route.name()),
            Err(e) => {
                error!(route = %route, error = %e, "Failed to set up route");
                report.record_failure(route.name(), e);
            },
        }
    }

    info!(%report, "Setup finished");
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_target_uses_route_table() {
        let route = Route::new("TPE HKI").unwrap();
        let target = LoadTarget::new(&route, "/data/TPE HKI/2024-01-01.csv");
        assert_eq!(target.table.as_str(), "tpe_hki");
        assert_eq!(target.path, PathBuf::from("/data/TPE HKI/2024-01-01.csv"));
    }
}
