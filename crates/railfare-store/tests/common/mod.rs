//! Shared harness for store integration tests
//!
//! Each test starts its own PostgreSQL container, so tests never see each
//! other's tables. Docker must be available; the tests are `#[ignore]`d by
//! default and run with `cargo test -- --ignored`.

#![allow(dead_code)]

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::{debug, info};

pub const HEADER: &str = "journey_id,departure_time,departure_station,arrival_station,\
                          arrival_time,price,train_number,train_type,eco_seats_available,\
                          request_date";

/// PostgreSQL test container wrapper
pub struct TestPostgres {
    container: ContainerAsync<Postgres>,
    pool: PgPool,
    connection_string: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        Self::start_with_options(PostgresOptions::default()).await
    }

    pub async fn start_with_options(options: PostgresOptions) -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag(&options.version)
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string =
            format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        debug!("PostgreSQL connection: {}", connection_string);

        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
            .connect(&connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self {
            container,
            pool,
            connection_string,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

/// Configuration options for the PostgreSQL test container
pub struct PostgresOptions {
    /// PostgreSQL version/tag (default: "16-alpine")
    pub version: String,
    /// Maximum number of connections in the pool (default: 2)
    pub max_connections: u32,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: u64,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            version: "16-alpine".to_string(),
            max_connections: 2,
            acquire_timeout_secs: 30,
        }
    }
}

/// Write a tabular file with the standard header and the given data rows
pub fn write_tabular(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    std::fs::write(&path, body).expect("Failed to write tabular fixture");
    path
}

/// Route tracing output to the test writer; safe to call from every test
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("railfare_store=debug,sqlx=warn")
        .with_test_writer()
        .try_init();
}
