// Paginated document renderer.
//
// A4 landscape pages: title and generation timestamp on the first page,
// then a table whose header row repeats on every page. Built-in Helvetica
// only, so no font files ship with the binary.

use std::path::Path;

use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use super::delimited::headers;
use super::rows::ExportRow;
use crate::error::CoreError;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 6.5;
const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 9.0;
const CELL_SIZE: f32 = 8.0;
/// Average Helvetica glyph width at `CELL_SIZE`, in millimetres.
const CHAR_WIDTH: f32 = 1.6;
/// Longest cell text considered when sizing a column.
const MAX_MEASURED_CHARS: usize = 40;
const FIRST_TABLE_TOP: f32 = PAGE_HEIGHT - 32.0;
const NEXT_TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - 4.0;
const LAYER: &str = "table";

/// Render `rows` as a PDF report at `path`.
pub fn write_pdf(
    rows: &[ExportRow],
    title: &str,
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<(), CoreError> {
    let headers = headers(rows);
    let widths = column_widths(&headers, rows, PAGE_WIDTH - 2.0 * MARGIN);

    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut current = doc.get_page(page).get_layer(layer);
    current.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(PAGE_HEIGHT - 18.0), &bold);
    current.use_text(
        format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        META_SIZE,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - 25.0),
        &regular,
    );

    let mut y = FIRST_TABLE_TOP;
    draw_header(&current, &headers, &widths, y, &bold);
    y -= ROW_HEIGHT;

    for row in rows {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            current = doc.get_page(page).get_layer(layer);
            y = NEXT_TABLE_TOP;
            draw_header(&current, &headers, &widths, y, &bold);
            y -= ROW_HEIGHT;
        }
        let cells: Vec<&str> = headers
            .iter()
            .map(|h| row.get(h).map_or("", String::as_str))
            .collect();
        draw_cells(&current, &cells, &widths, y, &regular);
        y -= ROW_HEIGHT;
    }

    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    std::fs::write(path, bytes).map_err(|e| CoreError::Export {
        message: format!("Cannot write {}: {e}", path.display()),
    })
}

fn draw_header(
    layer: &PdfLayerReference,
    headers: &[String],
    widths: &[f32],
    y: f32,
    font: &IndirectFontRef,
) {
    let cells: Vec<&str> = headers.iter().map(String::as_str).collect();
    layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.2, 0.45, None)));
    draw_cells(layer, &cells, widths, y, font);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    layer.set_outline_color(Color::Rgb(Rgb::new(0.1, 0.2, 0.45, None)));
    layer.set_outline_thickness(0.8);
    let rule_y = y - 2.0;
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(rule_y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(rule_y)), false),
        ],
        is_closed: false,
    });
}

fn draw_cells(
    layer: &PdfLayerReference,
    cells: &[&str],
    widths: &[f32],
    y: f32,
    font: &IndirectFontRef,
) {
    let mut x = MARGIN;
    for (text, width) in cells.iter().zip(widths) {
        layer.use_text(fit(text, *width), CELL_SIZE, Mm(x + 1.0), Mm(y), font);
        x += width;
    }
}

/// Split `total` millimetres across columns in proportion to their widest
/// text (header included, long cells capped).
pub(crate) fn column_widths(headers: &[String], rows: &[ExportRow], total: f32) -> Vec<f32> {
    let weights: Vec<f32> = headers
        .iter()
        .map(|h| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(h))
                .map(|v| v.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(1)
                .clamp(1, MAX_MEASURED_CHARS);
            small_f32(widest)
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    if sum <= 0.0 {
        return Vec::new();
    }
    weights.iter().map(|w| w / sum * total).collect()
}

/// Truncate `text` so it fits in a column `width` millimetres wide.
pub(crate) fn fit(text: &str, width: f32) -> String {
    let max = max_chars(width);
    if text.chars().count() <= max {
        return text.to_owned();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn max_chars(width: f32) -> usize {
    ((width - 2.0) / CHAR_WIDTH).floor().max(1.0) as usize
}

fn small_f32(n: usize) -> f32 {
    f32::from(u16::try_from(n).unwrap_or(u16::MAX))
}

fn pdf_err(e: printpdf::Error) -> CoreError {
    CoreError::Export {
        message: format!("PDF render failed: {e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> ExportRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn widths_fill_the_page() {
        let rows = vec![row(&[("Code", "PK-001"), ("Message", "Device offline for hours")])];
        let headers = headers(&rows);
        let widths = column_widths(&headers, &rows, 273.0);
        let sum: f32 = widths.iter().sum();
        assert!((sum - 273.0).abs() < 0.01);
        assert!(widths[1] > widths[0]);
    }

    #[test]
    fn long_text_is_truncated() {
        let fitted = fit(&"x".repeat(100), 20.0);
        assert!(fitted.ends_with("..."));
        assert_eq!(fitted.chars().count(), max_chars(20.0));
        assert_eq!(fit("short", 50.0), "short");
    }

    #[test]
    fn multi_page_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.pdf");
        let rows: Vec<ExportRow> = (0..80)
            .map(|i| row(&[("Device Code", &format!("PK-{i:03}")), ("Status", "OK")]))
            .collect();

        write_pdf(&rows, "Device Report", Utc::now(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
