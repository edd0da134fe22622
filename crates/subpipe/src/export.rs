//! CSV export of wide rows.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::records::{WideRow, WIDE_COLUMNS};

/// Writes the rows to `path` as comma-separated values, truncating any
/// existing content. The header row is written even when there are no
/// data rows.
pub fn write_csv(rows: &[WideRow], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(WIDE_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Data exported to CSV, {} rows submitted", rows.len());
    Ok(())
}
