//! Pipeline configuration
//!
//! Where the dated route folders live and which routes to process. Values come
//! from the environment (after loading `.env`), with the route list falling back
//! to a plain routes file holding one route name per line.

use crate::error::{RailfareError, Result};
use crate::route::Route;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Default root folder holding one sub-folder per route.
pub const DEFAULT_DESTINATION_FOLDER: &str = "./data";

/// Default file listing the routes, one per line.
pub const DEFAULT_ROUTES_FILE: &str = "directions.txt";

/// Extension of raw search dumps.
pub const DEFAULT_RAW_EXTENSION: &str = "txt";

/// Extension of transformed tabular files.
pub const DEFAULT_TABULAR_EXTENSION: &str = "csv";

/// File-side pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root folder, `<destination_folder>/<route>/<yyyy-mm-dd>.<ext>`
    pub destination_folder: PathBuf,
    /// Route folder names, e.g. `"HKI TPE"`
    pub routes: Vec<String>,
    /// Routes file consulted when no routes are given through the environment
    pub routes_file: PathBuf,
    pub raw_extension: String,
    pub tabular_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            destination_folder: PathBuf::from(DEFAULT_DESTINATION_FOLDER),
            routes: Vec::new(),
            routes_file: PathBuf::from(DEFAULT_ROUTES_FILE),
            raw_extension: DEFAULT_RAW_EXTENSION.to_string(),
            tabular_extension: DEFAULT_TABULAR_EXTENSION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `.env`, environment variables and the routes file
    ///
    /// Environment variables:
    /// - `RAILFARE_DESTINATION_FOLDER`: root folder (default `./data`)
    /// - `RAILFARE_ROUTES`: comma separated route names
    /// - `RAILFARE_ROUTES_FILE`: routes file used when `RAILFARE_ROUTES` is unset
    /// - `RAILFARE_RAW_EXTENSION` / `RAILFARE_TABULAR_EXTENSION`
    ///
    /// A missing routes file is not an error: the route list is left empty.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(folder) = std::env::var("RAILFARE_DESTINATION_FOLDER") {
            config.destination_folder = PathBuf::from(folder);
        }

        if let Ok(file) = std::env::var("RAILFARE_ROUTES_FILE") {
            config.routes_file = PathBuf::from(file);
        }

        if let Ok(ext) = std::env::var("RAILFARE_RAW_EXTENSION") {
            config.raw_extension = ext.trim_start_matches('.').to_string();
        }

        if let Ok(ext) = std::env::var("RAILFARE_TABULAR_EXTENSION") {
            config.tabular_extension = ext.trim_start_matches('.').to_string();
        }

        config.routes = match std::env::var("RAILFARE_ROUTES") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => read_routes_file(&config.routes_file)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.raw_extension.is_empty() || self.tabular_extension.is_empty() {
            return Err(RailfareError::config("file extensions cannot be empty"));
        }

        if self.raw_extension == self.tabular_extension {
            return Err(RailfareError::config(format!(
                "raw and tabular extensions must differ, both are '{}'",
                self.raw_extension
            )));
        }

        self.routes()?;

        if self.routes.is_empty() {
            warn!("No routes configured - nothing will be processed");
        }

        Ok(())
    }

    /// Configured routes with their derived table names
    pub fn routes(&self) -> Result<Vec<Route>> {
        self.routes.iter().map(Route::new).collect()
    }
}

/// Read a routes file, one route per line; a missing file yields no routes
pub fn read_routes_file(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Routes file not found, using an empty route list");
            Ok(Vec::new())
        },
        Err(e) => Err(RailfareError::file_access(path, e)),
    }
}
