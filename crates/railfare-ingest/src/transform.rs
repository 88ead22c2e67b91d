//! Transform batch driver
//!
//! Runs each raw dump through parse, flatten and write. A file that cannot be
//! read or written is logged, recorded as failed, and the batch moves on.

use crate::catalog::SourceFile;
use crate::flatten::flatten_file;
use crate::response::parse_file;
use crate::writer::write_atomic;
use railfare_common::{BatchReport, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Transform every raw file into its tabular sibling with `tabular_extension`
pub fn transform_files(files: &[SourceFile], tabular_extension: &str) -> BatchReport {
    for file in files {
        info!(route = %file.route, "{} planned to be processed", file.path.display());
    }

    let mut report = BatchReport::new();
    for file in files {
        let item = file.path.display().to_string();
        match transform_file(file, tabular_extension) {
            Ok(output) => {
                info!(route = %file.route, "{} has been recorded", output.display());
                report.record_success(item);
            },
            Err(e) => {
                error!(path = %item, error = %e, "Failed to transform file");
                report.record_failure(item, e);
            },
        }
    }

    info!(%report, "Transform finished");
    report
}

/// Transform one raw file, returning the path of the written table
pub fn transform_file(file: &SourceFile, tabular_extension: &str) -> Result<PathBuf> {
    let parsed = parse_file(&file.path)?;
    if !parsed.rejected.is_empty() {
        warn!(
            path = %file.path.display(),
            rejected = parsed.rejected.len(),
            "Dropped malformed lines"
        );
    }

    let blob = flatten_file(&parsed.responses, &file.request_date())?;
    let output = file.sibling(tabular_extension);

    write_atomic(&blob, &output)?;
    Ok(output)
}
