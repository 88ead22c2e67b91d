//! Bulk loading of tabular files into route tables
//!
//! A file is loaded all or nothing: its rows are inserted and the views are
//! refreshed in one transaction. Loads append; loading the same file twice
//! stores its rows twice.

use crate::db::{StoreError, StoreResult};
use crate::refresh::refresh_views;
use crate::schema::quote_ident;
use railfare_common::{TableName, FLAT_ROW_COLUMNS};
use sqlx::{PgPool, Postgres};
use std::path::Path;
use tracing::{debug, info, warn};

/// Placeholder casts, one per column in [`FLAT_ROW_COLUMNS`] order
const PLACEHOLDERS: [&str; 10] = [
    "$1",
    "$2::timestamptz",
    "$3",
    "$4",
    "$5::timestamptz",
    "$6::numeric",
    "$7",
    "$8",
    "$9::smallint",
    "$10::date",
];

/// Outcome of one successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_inserted: u64,
}

pub fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table.as_str()),
        FLAT_ROW_COLUMNS.join(", "),
        PLACEHOLDERS.join(", ")
    )
}

/// Read every data row of a tabular file, checking each has one field per column
pub fn read_rows(path: &Path) -> StoreResult<Vec<csv::StringRecord>> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let header = reader.headers()?;
    if !header.iter().eq(FLAT_ROW_COLUMNS) {
        warn!(path = %path.display(), header = ?header, "Unexpected header, loading by position");
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != FLAT_ROW_COLUMNS.len() {
            return Err(StoreError::RowShape {
                line: record.position().map_or(0, |p| p.line()),
                found: record.len(),
                expected: FLAT_ROW_COLUMNS.len(),
            });
        }
        rows.push(record);
    }

    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct BulkLoader {
    pool: PgPool,
}

impl BulkLoader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append every row of `path` to `table` and refresh its views
    ///
    /// On any error the transaction is dropped unfinished and rolls back, leaving
    /// the table and its views as they were.
    #[tracing::instrument(skip(self, table, path), fields(table = %table, path = %path.display()))]
    pub async fn load_rows(&self, table: &TableName, path: &Path) -> StoreResult<LoadStats> {
        let rows = read_rows(path)?;
        let sql = insert_sql(table);

        let mut tx = self.pool.begin().await?;

        let mut rows_inserted = 0u64;
        for row in &rows {
            let mut query = sqlx::query::<Postgres>(&sql);
            for field in row.iter() {
                query = query.bind(field);
            }
            rows_inserted += query.execute(&mut *tx).await?.rows_affected();
        }
        debug!(rows_inserted, "Rows inserted, refreshing views");

        refresh_views(&mut tx, table).await?;
        tx.commit().await?;

        info!("Data from {} has been loaded into {}", path.display(), table);
        Ok(LoadStats { rows_inserted })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "journey_id,departure_time,departure_station,arrival_station,\
                          arrival_time,price,train_number,train_type,eco_seats_available,\
                          request_date";

    #[test]
    fn test_insert_sql_casts_typed_columns() {
        let sql = insert_sql(&TableName::from_route("HKI TPE").unwrap());
        assert!(sql.starts_with("INSERT INTO \"hki_tpe\" (journey_id, departure_time,"));
        assert!(sql.ends_with("$9::smallint, $10::date)"));
        assert!(sql.contains("$6::numeric"));
    }

    #[test]
    fn test_read_rows_skips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01.csv");
        fs::write(
            &path,
            format!(
                "{}\nJ1,2024-01-01T10:00,HKI,TPE,2024-01-01T14:00,150.0,7,IC,42,2024-01-01\n\
                 \"J,2\",2024-01-01T11:00,HKI,TPE,2024-01-01T15:00,99.5,9,IC,-1,2024-01-01",
                HEADER
            ),
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][5], "150.0");
        assert_eq!(&rows[1][0], "J,2");
    }

    #[test]
    fn test_read_rows_rejects_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01.csv");
        fs::write(
            &path,
            format!(
                "{}\nJ1,2024-01-01T10:00,HKI,TPE,2024-01-01T14:00,150.0,7,IC,42,2024-01-01\n\
                 J2,2024-01-01T11:00,HKI",
                HEADER
            ),
        )
        .unwrap();

        match read_rows(&path) {
            Err(StoreError::RowShape { line, found, expected }) => {
                assert_eq!(line, 3);
                assert_eq!(found, 3);
                assert_eq!(expected, 10);
            },
            other => panic!("expected row shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_rows_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_rows(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
