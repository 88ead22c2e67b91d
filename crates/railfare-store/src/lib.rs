//! Railfare Store Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The PostgreSQL side of the pipeline: per-route tables, their two
//! materialized views, and transactional loads that keep the views in step
//! with the latest `request_date`.
//!
//! # Example
//!
//! ```no_run
//! use railfare_common::Route;
//! use railfare_store::{create_pool, BulkLoader, DbConfig, SchemaManager};
//! use std::path::Path;
//!
//! # async fn run() -> railfare_store::StoreResult<()> {
//! let pool = create_pool(&DbConfig::from_env()?).await?;
//! let route = Route::new("HKI TPE")?;
//!
//! let schema = SchemaManager::new(pool.clone());
//! schema.ensure_refresh_function().await?;
//! schema.ensure_route(&route, false).await?;
//!
//! let loader = BulkLoader::new(pool);
//! loader
//!     .load_rows(route.table_name(), Path::new("./data/HKI TPE/2024-01-01.csv"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod db;
pub mod loader;
pub mod refresh;
pub mod schema;

pub use batch::{load_files, setup_routes, LoadTarget};
pub use db::{create_pool, health_check, DbConfig, StoreError, StoreResult};
pub use loader::{BulkLoader, LoadStats};
pub use refresh::refresh_views;
pub use schema::SchemaManager;
