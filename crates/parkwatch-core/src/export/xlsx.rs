// Spreadsheet renderer: one worksheet per logical table, bold header row,
// autofit columns.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::Sheet;
use super::delimited::headers;
use crate::error::CoreError;

/// Excel's sheet-name limit.
const MAX_SHEET_NAME: usize = 31;

pub fn write_workbook(sheets: &[Sheet<'_>], path: &Path) -> Result<(), CoreError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(sheet.name)).map_err(xlsx_err)?;

        let headers = headers(sheet.rows);
        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, column(col)?, header, &bold)
                .map_err(xlsx_err)?;
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_num = u32::try_from(idx + 1).map_err(|_| too_large("rows"))?;
            for (col, header) in headers.iter().enumerate() {
                let value = row.get(header).map_or("", String::as_str);
                worksheet
                    .write_string(row_num, column(col)?, value)
                    .map_err(xlsx_err)?;
            }
        }

        worksheet.autofit();
    }

    workbook.save(path).map_err(xlsx_err)
}

/// Strip characters Excel rejects in sheet names and clamp the length.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_owned()
    } else {
        cleaned
    }
}

fn column(idx: usize) -> Result<u16, CoreError> {
    u16::try_from(idx).map_err(|_| too_large("columns"))
}

fn too_large(what: &str) -> CoreError {
    CoreError::Export {
        message: format!("too many {what} for a worksheet"),
    }
}

fn xlsx_err(e: XlsxError) -> CoreError {
    CoreError::Export {
        message: format!("Spreadsheet write failed: {e}"),
    }
}
