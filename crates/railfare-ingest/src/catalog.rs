//! Dated file discovery across route directories
//!
//! Layout: `<root>/<route>/<yyyy-mm-dd>.<ext>`. The stem of every file is the
//! request date of the search dump it holds, so selection is purely by name.
//!
//! Two selection policies exist:
//! - [`FileCatalog::files_since`]: every file of one extension dated on or after a cutoff
//! - [`FileCatalog::files_unpaired`]: raw files whose tabular output does not exist yet
//!
//! Discovery never fails as a whole. An unreadable route directory is logged and
//! skipped, as is any entry whose name is not a date.

use chrono::{Local, NaiveDate};
use railfare_common::config::{PipelineConfig, DEFAULT_RAW_EXTENSION, DEFAULT_TABULAR_EXTENSION};
use railfare_common::{RailfareError, Result, Route};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A dated file belonging to one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub route: Route,
    pub date: NaiveDate,
    pub path: PathBuf,
}

impl SourceFile {
    /// The file's date as `yyyy-mm-dd`, stamped on every row derived from it
    pub fn request_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Same route and date, other extension
    pub fn sibling(&self, extension: &str) -> PathBuf {
        self.path.with_extension(extension)
    }
}

/// Parse a file stem of the form `yyyy-mm-dd`
pub fn parse_file_date(stem: &str) -> Result<NaiveDate> {
    if stem.len() != 10 {
        return Err(RailfareError::InvalidFileName(stem.to_string()));
    }
    NaiveDate::parse_from_str(stem, "%Y-%m-%d")
        .map_err(|_| RailfareError::InvalidFileName(stem.to_string()))
}

/// Catalog of route directories under one root
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
    raw_extension: String,
    tabular_extension: String,
}

/// File entry of a route directory (symlinks resolved)
struct DirEntry {
    path: PathBuf,
    stem: String,
}

impl FileCatalog {
    /// Catalog with the default `txt` raw and `csv` tabular extensions
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            raw_extension: DEFAULT_RAW_EXTENSION.to_string(),
            tabular_extension: DEFAULT_TABULAR_EXTENSION.to_string(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.destination_folder)
            .with_extensions(&config.raw_extension, &config.tabular_extension)
    }

    pub fn with_extensions(mut self, raw: impl Into<String>, tabular: impl Into<String>) -> Self {
        self.raw_extension = raw.into();
        self.tabular_extension = tabular.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_extension(&self) -> &str {
        &self.raw_extension
    }

    pub fn tabular_extension(&self) -> &str {
        &self.tabular_extension
    }

    pub fn route_dir(&self, route: &Route) -> PathBuf {
        self.root.join(route.name())
    }

    /// Files with `extension` dated on or after `cutoff` (today when `None`)
    ///
    /// Results are ordered by route as given, then by date within a route.
    pub fn files_since(
        &self,
        routes: &[Route],
        extension: &str,
        cutoff: Option<NaiveDate>,
    ) -> Vec<SourceFile> {
        let cutoff = cutoff.unwrap_or_else(|| Local::now().date_naive());
        debug!(%cutoff, extension, "Selecting files by date");

        let mut selected = Vec::new();
        for route in routes {
            let Some(entries) = self.list_route(route) else {
                continue;
            };

            let mut files: Vec<SourceFile> = entries
                .into_iter()
                .filter_map(|entry| {
                    let date = dated(&entry)?;
                    let matches = entry.path.extension() == Some(OsStr::new(extension));
                    (matches && date >= cutoff).then(|| SourceFile {
                        route: route.clone(),
                        date,
                        path: entry.path,
                    })
                })
                .collect();

            files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
            selected.extend(files);
        }

        selected
    }

    /// Raw files that have no tabular sibling with the same stem
    pub fn files_unpaired(&self, routes: &[Route]) -> Vec<SourceFile> {
        let raw = OsStr::new(&self.raw_extension);

        let mut selected = Vec::new();
        for route in routes {
            let Some(entries) = self.list_route(route) else {
                continue;
            };

            let mut files: Vec<SourceFile> = entries
                .into_iter()
                .filter(|entry| entry.path.extension() == Some(raw))
                .filter(|entry| !entry.path.with_extension(&self.tabular_extension).exists())
                .filter_map(|entry| {
                    let date = dated(&entry)?;
                    Some(SourceFile {
                        route: route.clone(),
                        date,
                        path: entry.path,
                    })
                })
                .collect();

            files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
            selected.extend(files);
        }

        selected
    }

    /// Regular files of one route directory, following symlinks
    ///
    /// `None` when the directory cannot be listed.
    fn list_route(&self, route: &Route) -> Option<Vec<DirEntry>> {
        let dir = self.route_dir(route);
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                let err = RailfareError::file_access(&dir, e);
                warn!(route = %route, error = %err, "Skipping unreadable route directory");
                return None;
            },
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(route = %route, error = %e, "Failed to read directory entry");
                    continue;
                },
            };

            let path = entry.path();
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {},
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat entry");
                    continue;
                },
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push(DirEntry { path, stem });
        }

        Some(entries)
    }
}

fn dated(entry: &DirEntry) -> Option<NaiveDate> {
    match parse_file_date(&entry.stem) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(path = %entry.path.display(), error = %e, "Skipping file with undated name");
            None
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(files: &[&str]) -> (TempDir, Vec<Route>) {
        let root = tempfile::tempdir().unwrap();
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        let routes = vec![Route::new("HKI TPE").unwrap(), Route::new("TPE HKI").unwrap()];
        (root, routes)
    }

    fn names(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                format!(
                    "{}/{}",
                    f.route.name(),
                    f.path.file_name().unwrap().to_string_lossy()
                )
            })
            .collect()
    }

    fn date(s: &str) -> NaiveDate {
        parse_file_date(s).unwrap()
    }

    #[test]
    fn test_parse_file_date() {
        assert_eq!(date("2024-01-01"), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(parse_file_date("2024-1-1").is_err());
        assert!(parse_file_date("2024-02-30").is_err());
        assert!(parse_file_date("notes").is_err());
    }

    #[test]
    fn test_files_since_filters_by_cutoff_and_extension() {
        let (root, routes) = fixture(&[
            "HKI TPE/2024-01-03.txt",
            "HKI TPE/2023-12-31.txt",
            "HKI TPE/2024-01-01.txt",
            "HKI TPE/2024-01-02.csv",
            "TPE HKI/2024-01-05.txt",
        ]);
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_since(&routes, "txt", Some(date("2024-01-01")));
        assert_eq!(
            names(&files),
            vec![
                "HKI TPE/2024-01-01.txt",
                "HKI TPE/2024-01-03.txt",
                "TPE HKI/2024-01-05.txt"
            ]
        );
        assert_eq!(files[0].request_date(), "2024-01-01");

        let csv = catalog.files_since(&routes, "csv", Some(date("2024-01-01")));
        assert_eq!(names(&csv), vec!["HKI TPE/2024-01-02.csv"]);
    }

    #[test]
    fn test_files_since_defaults_to_today() {
        let today = Local::now().date_naive();
        let yesterday = today.pred_opt().unwrap();
        let (root, routes) = fixture(&[
            &format!("HKI TPE/{}.txt", yesterday.format("%Y-%m-%d")),
            &format!("HKI TPE/{}.txt", today.format("%Y-%m-%d")),
        ]);
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_since(&routes[..1], "txt", None);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].date, today);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dumps_are_listed() {
        let (root, routes) = fixture(&["HKI TPE/2024-01-01.txt", "archive/2024-01-02.txt"]);
        std::os::unix::fs::symlink(
            root.path().join("archive/2024-01-02.txt"),
            root.path().join("HKI TPE/2024-01-02.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            root.path().join("archive/missing.txt"),
            root.path().join("HKI TPE/2024-01-03.txt"),
        )
        .unwrap();
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_unpaired(&routes[..1]);
        assert_eq!(
            names(&files),
            vec!["HKI TPE/2024-01-01.txt", "HKI TPE/2024-01-02.txt"]
        );
    }

    #[test]
    fn test_files_since_skips_undated_names() {
        let (root, routes) = fixture(&["HKI TPE/notes.txt", "HKI TPE/2024-01-01.txt"]);
        fs::create_dir_all(root.path().join("HKI TPE/2024-01-09.txt")).unwrap();
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_since(&routes[..1], "txt", Some(date("2020-01-01")));
        assert_eq!(names(&files), vec!["HKI TPE/2024-01-01.txt"]);
    }

    #[test]
    fn test_missing_route_directory_is_skipped() {
        let (root, _) = fixture(&["TPE HKI/2024-01-01.txt"]);
        let routes = vec![Route::new("HKI TPE").unwrap(), Route::new("TPE HKI").unwrap()];
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_since(&routes, "txt", Some(date("2024-01-01")));
        assert_eq!(names(&files), vec!["TPE HKI/2024-01-01.txt"]);

        let unpaired = catalog.files_unpaired(&routes);
        assert_eq!(names(&unpaired), vec!["TPE HKI/2024-01-01.txt"]);
    }

    #[test]
    fn test_files_unpaired_returns_raw_files_without_output() {
        let (root, routes) = fixture(&[
            "HKI TPE/2024-01-01.txt",
            "HKI TPE/2024-01-01.csv",
            "HKI TPE/2024-01-02.txt",
            "HKI TPE/2024-01-03.csv",
            "TPE HKI/2024-01-02.txt",
        ]);
        let catalog = FileCatalog::new(root.path());

        let files = catalog.files_unpaired(&routes);
        assert_eq!(
            names(&files),
            vec!["HKI TPE/2024-01-02.txt", "TPE HKI/2024-01-02.txt"]
        );
        assert_eq!(files[0].sibling("csv"), root.path().join("HKI TPE/2024-01-02.csv"));
    }

    #[test]
    fn test_custom_extensions() {
        let (root, routes) = fixture(&["HKI TPE/2024-01-01.jsonl", "HKI TPE/2024-01-02.jsonl"]);
        fs::write(root.path().join("HKI TPE/2024-01-01.tsv"), "").unwrap();
        let catalog = FileCatalog::new(root.path()).with_extensions("jsonl", "tsv");

        let files = catalog.files_unpaired(&routes[..1]);
        assert_eq!(names(&files), vec!["HKI TPE/2024-01-02.jsonl"]);
    }
}
