//! View refresh after a load
//!
//! Both views of a table are recomputed by one call to the shared procedure,
//! on the caller's connection. Called inside the load transaction, a failed
//! refresh rolls the inserted rows back with it, so views and table never
//! disagree about the latest `request_date`.

use crate::db::StoreResult;
use crate::schema::REFRESH_FUNCTION;
use railfare_common::TableName;
use sqlx::PgConnection;
use tracing::debug;

/// Recompute `<table>_current` and `<table>_price_range`
pub async fn refresh_views(conn: &mut PgConnection, table: &TableName) -> StoreResult<()> {
    let start = std::time::Instant::now();

    sqlx::query(&format!("SELECT {}($1)", REFRESH_FUNCTION))
        .bind(table.as_str())
        .execute(&mut *conn)
        .await?;

    debug!(
        table = %table,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Materialized views refreshed"
    );
    Ok(())
}
