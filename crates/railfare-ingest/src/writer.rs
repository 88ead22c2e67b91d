//! Tabular file output
//!
//! Files are written to a temporary sibling and renamed into place, so a reader
//! (or a crash) never observes a half-written table.

use railfare_common::{RailfareError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// Replace the file at `path` with `blob`
///
/// Returns `false` and logs the cause when the file could not be written;
/// a pre-existing file is left untouched in that case.
pub fn write_table(blob: &str, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match write_atomic(blob, path) {
        Ok(()) => {
            debug!(path = %path.display(), bytes = blob.len(), "Wrote table");
            true
        },
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write table");
            false
        },
    }
}

/// Replace the file at `path` with `blob`, returning the cause on failure
pub fn write_atomic(blob: &str, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| RailfareError::file_access(dir, e))?;
    file.write_all(blob.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| RailfareError::file_access(file.path(), e))?;

    file.persist(path)
        .map_err(|e| RailfareError::file_access(path, e.error))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_table_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01.csv");

        assert!(write_table("a,b\n1,2", &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,2");
    }

    #[test]
    fn test_write_table_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01.csv");
        fs::write(&path, "old content that is longer than the new one").unwrap();

        assert!(write_table("new", &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_keeps_io_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-route").join("2024-01-01.csv");

        match write_atomic("a,b", &path) {
            Err(RailfareError::FileAccess { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            },
            other => panic!("expected file access error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_table_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-route").join("2024-01-01.csv");

        assert!(!write_table("a,b", &path));
        assert!(!path.exists());
    }
}
