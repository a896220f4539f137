// Delimited-text renderer.
//
// Header row first. Fields containing a comma, quote or line break are
// wrapped in quotes with internal quotes doubled.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use super::rows::ExportRow;
use crate::error::CoreError;

/// Column order: first row's columns, then any extra columns later rows add.
pub(crate) fn headers(rows: &[ExportRow]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), CoreError> {
    let headers = headers(rows);
    let mut out = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    out.write_record(&headers).map_err(export_err)?;
    for row in rows {
        out.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map_or("", String::as_str)),
        )
        .map_err(export_err)?;
    }
    out.flush().map_err(|e| CoreError::Export {
        message: e.to_string(),
    })
}

pub fn to_csv_string(rows: &[ExportRow]) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CoreError::Export {
        message: e.to_string(),
    })
}

fn export_err(e: csv::Error) -> CoreError {
    CoreError::Export {
        message: format!("CSV write failed: {e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(cells: &[(&str, &str)]) -> ExportRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn comma_field_is_quoted() {
        let csv = to_csv_string(&[row(&[("a", "1"), ("b", "x,y")])]).unwrap();
        assert_eq!(csv, "a,b\n1,\"x,y\"\n");
    }

    #[test]
    fn quotes_are_doubled_and_newlines_wrapped() {
        let csv = to_csv_string(&[row(&[("msg", "say \"hi\""), ("note", "two\nlines")])]).unwrap();
        assert_eq!(csv, "msg,note\n\"say \"\"hi\"\"\",\"two\nlines\"\n");
    }

    #[test]
    fn ragged_rows_keep_a_stable_header() {
        let csv = to_csv_string(&[row(&[("a", "1")]), row(&[("a", "2"), ("b", "3")])]).unwrap();
        assert_eq!(csv, "a,b\n1,\n2,3\n");
    }
}
