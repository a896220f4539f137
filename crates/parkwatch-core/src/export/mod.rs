// ── Export to local files ──
//
// Records are flattened into `ExportRow`s (see `rows`) and handed to one of
// three renderers: delimited text, spreadsheet workbook, or paginated PDF.
// Empty input is never written.

mod delimited;
mod pdf;
pub mod rows;
mod xlsx;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::error::CoreError;

pub use delimited::{to_csv_string, write_csv};
pub use rows::{ExportRow, NOT_AVAILABLE, ToExportRow, to_rows};

pub const NO_DATA_MESSAGE: &str = "No data to export";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    #[strum(serialize = "csv")]
    Csv,
    #[strum(to_string = "excel", serialize = "xlsx")]
    Excel,
    #[strum(serialize = "pdf")]
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

/// What an export call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// Nothing to write; the caller shows [`NO_DATA_MESSAGE`].
    NoData,
    /// The format name was not recognised.
    Skipped { format: String },
}

/// One worksheet of a multi-table workbook.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub name: &'a str,
    pub rows: &'a [ExportRow],
}

/// `{base}_{YYYY-MM-DD}.{ext}`
pub fn file_name(base: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!("{base}_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Write one table in `format` to `path`.
pub fn export_table(
    format: ExportFormat,
    rows: &[ExportRow],
    title: &str,
    path: &Path,
) -> Result<ExportOutcome, CoreError> {
    if rows.is_empty() {
        warn!(title, "{NO_DATA_MESSAGE}");
        return Ok(ExportOutcome::NoData);
    }

    match format {
        ExportFormat::Csv => {
            let file = std::fs::File::create(path).map_err(|e| io_err(path, &e))?;
            write_csv(rows, file)?;
        }
        ExportFormat::Excel => xlsx::write_workbook(&[Sheet { name: title, rows }], path)?,
        ExportFormat::Pdf => pdf::write_pdf(rows, title, Utc::now(), path)?,
    }

    info!(path = %path.display(), rows = rows.len(), %format, "export written");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

/// Like [`export_table`], with the format given by name. Unknown names are
/// logged and skipped.
pub fn export_named(
    format_name: &str,
    rows: &[ExportRow],
    title: &str,
    path: &Path,
) -> Result<ExportOutcome, CoreError> {
    match format_name.parse::<ExportFormat>() {
        Ok(format) => export_table(format, rows, title, path),
        Err(_) => {
            warn!(format = format_name, "unsupported export format, skipping");
            Ok(ExportOutcome::Skipped {
                format: format_name.to_owned(),
            })
        }
    }
}

/// Write several tables into one workbook, one sheet each. Empty sheets are
/// left out; if every sheet is empty nothing is written.
pub fn export_workbook(sheets: &[Sheet<'_>], path: &Path) -> Result<ExportOutcome, CoreError> {
    let non_empty: Vec<Sheet<'_>> = sheets.iter().copied().filter(|s| !s.rows.is_empty()).collect();
    if non_empty.is_empty() {
        warn!("{NO_DATA_MESSAGE}");
        return Ok(ExportOutcome::NoData);
    }

    xlsx::write_workbook(&non_empty, path)?;
    let rows = non_empty.iter().map(|s| s.rows.len()).sum();
    info!(path = %path.display(), sheets = non_empty.len(), rows, "workbook written");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows,
    })
}

fn io_err(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::Export {
        message: format!("Cannot write {}: {e}", path.display()),
    }
}
