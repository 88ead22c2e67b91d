//! Route table, view and trigger management
//!
//! Every route owns one table plus two materialized views derived from the
//! table's most recent `request_date`:
//!
//! - `<table>_current`: the freshest journeys with split date/time columns
//! - `<table>_price_range`: min/max price per departure day
//!
//! One shared PL/pgSQL procedure refreshes both views of a table by name. The
//! loader calls it directly; a statement-level `AFTER UPDATE` trigger per table
//! calls it through an adapter so manual corrections also refresh the views.
//!
//! Identifiers come from validated [`TableName`]s and are always double-quoted.
//! Each operation runs in its own transaction.

use crate::db::StoreResult;
use railfare_common::{Route, TableName};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

/// Procedure refreshing both views of the table named by its argument
pub const REFRESH_FUNCTION: &str = "refresh_route_views";

/// Trigger adapter forwarding `TG_ARGV[0]` to [`REFRESH_FUNCTION`]
pub const REFRESH_TRIGGER_FUNCTION: &str = "refresh_route_views_trigger";

pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ============================================================================
// Statement builders
// ============================================================================

pub fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id SERIAL PRIMARY KEY,
            journey_id VARCHAR(40),
            departure_time TIMESTAMPTZ,
            departure_station VARCHAR(3),
            arrival_station VARCHAR(3),
            arrival_time TIMESTAMPTZ,
            price NUMERIC(5,2),
            train_number VARCHAR(4),
            train_type VARCHAR(3),
            eco_seats_available SMALLINT,
            request_date DATE
        )",
        quote_ident(table.as_str())
    )
}

pub fn create_refresh_function_sql() -> String {
    format!(
        "CREATE OR REPLACE FUNCTION {REFRESH_FUNCTION}(route_table TEXT)
        RETURNS VOID AS $$
        BEGIN
            EXECUTE format('REFRESH MATERIALIZED VIEW %I', route_table || '_current');
            EXECUTE format('REFRESH MATERIALIZED VIEW %I', route_table || '_price_range');
        END;
        $$ LANGUAGE plpgsql"
    )
}

pub fn create_refresh_trigger_function_sql() -> String {
    format!(
        "CREATE OR REPLACE FUNCTION {REFRESH_TRIGGER_FUNCTION}()
        RETURNS TRIGGER AS $$
        BEGIN
            IF TG_ARGV[0] IS NOT NULL THEN
                PERFORM {REFRESH_FUNCTION}(TG_ARGV[0]);
            END IF;
            RETURN NULL;
        END;
        $$ LANGUAGE plpgsql"
    )
}

pub fn create_current_view_sql(table: &TableName) -> String {
    let source = quote_ident(table.as_str());
    format!(
        "CREATE MATERIALIZED VIEW IF NOT EXISTS {view} AS
        SELECT journey_id,
               departure_time::TIMESTAMP::DATE AS dep_date,
               departure_time::TIMESTAMP::TIME AS dep_time,
               arrival_time - departure_time AS time_travel,
               arrival_time::TIMESTAMP::DATE AS arr_date,
               arrival_time::TIMESTAMP::TIME AS arr_time,
               eco_seats_available,
               price,
               request_date
        FROM {source}
        WHERE request_date = (SELECT MAX(request_date) FROM {source})
        WITH DATA",
        view = quote_ident(&table.current_view()),
    )
}

pub fn create_price_range_view_sql(table: &TableName) -> String {
    let source = quote_ident(table.as_str());
    format!(
        "CREATE MATERIALIZED VIEW IF NOT EXISTS {view} AS
        SELECT departure_time::TIMESTAMP::DATE AS dep_date,
               MIN(price) AS min_price,
               MAX(price) AS max_price
        FROM {source}
        WHERE request_date = (SELECT MAX(request_date) FROM {source})
        GROUP BY dep_date
        ORDER BY dep_date
        WITH DATA",
        view = quote_ident(&table.price_range_view()),
    )
}

pub fn drop_view_sql(view: &str) -> String {
    format!("DROP MATERIALIZED VIEW IF EXISTS {}", quote_ident(view))
}

pub fn drop_trigger_sql(table: &TableName) -> String {
    format!(
        "DROP TRIGGER IF EXISTS {} ON {}",
        quote_ident(&table.trigger_name()),
        quote_ident(table.as_str())
    )
}

pub fn create_trigger_sql(table: &TableName) -> String {
    format!(
        "CREATE TRIGGER {trigger}
        AFTER UPDATE ON {table}
        FOR EACH STATEMENT
        EXECUTE FUNCTION {REFRESH_TRIGGER_FUNCTION}({arg})",
        trigger = quote_ident(&table.trigger_name()),
        table = quote_ident(table.as_str()),
        arg = quote_literal(table.as_str()),
    )
}

async fn execute_all(conn: &mut PgConnection, statements: &[String]) -> StoreResult<()> {
    for statement in statements {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

// ============================================================================
// Manager
// ============================================================================

/// Installs and repairs the per-route schema objects
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[tracing::instrument(skip(self, table), fields(table = %table))]
    pub async fn ensure_table(&self, table: &TableName) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        execute_all(&mut tx, &[create_table_sql(table)]).await?;
        tx.commit().await?;

        info!("Table {} is ready", table);
        Ok(())
    }

    /// Install the shared refresh procedure and its trigger adapter
    #[tracing::instrument(skip(self))]
    pub async fn ensure_refresh_function(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        execute_all(
            &mut tx,
            &[
                create_refresh_function_sql(),
                create_refresh_trigger_function_sql(),
            ],
        )
        .await?;
        tx.commit().await?;

        info!("Function {}() has been created", REFRESH_FUNCTION);
        Ok(())
    }

    /// Create both views of `table`; with `recreate` existing ones are dropped first
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    pub async fn ensure_views(&self, table: &TableName, recreate: bool) -> StoreResult<()> {
        let mut statements = Vec::with_capacity(4);
        if recreate {
            statements.push(drop_view_sql(&table.current_view()));
            statements.push(drop_view_sql(&table.price_range_view()));
        }
        statements.push(create_current_view_sql(table));
        statements.push(create_price_range_view_sql(table));

        let mut tx = self.pool.begin().await?;
        execute_all(&mut tx, &statements).await?;
        tx.commit().await?;

        if recreate {
            debug!("Old materialized views of {} have been dropped", table);
        }
        info!(
            "Materialized views {} and {} are ready",
            table.current_view(),
            table.price_range_view()
        );
        Ok(())
    }

    /// (Re)install the refresh trigger of `table`
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    pub async fn ensure_trigger(&self, table: &TableName) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        execute_all(&mut tx, &[drop_trigger_sql(table), create_trigger_sql(table)]).await?;
        tx.commit().await?;

        info!("Trigger {} has been created", table.trigger_name());
        Ok(())
    }

    /// Table, views and trigger for one route
    pub async fn ensure_route(&self, route: &Route, recreate: bool) -> StoreResult<()> {
        let table = route.table_name();
        self.ensure_table(table).await?;
        self.ensure_views(table, recreate).await?;
        self.ensure_trigger(table).await
    }
}
