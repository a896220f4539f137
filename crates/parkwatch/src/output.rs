//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use parkwatch_core::HealthTier;
use parkwatch_core::models::{AlertSeverity, DeviceStatus};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

pub fn paint_status(status: DeviceStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        DeviceStatus::Ok => text.green().to_string(),
        DeviceStatus::Warning => text.yellow().to_string(),
        DeviceStatus::Critical => text.red().bold().to_string(),
        DeviceStatus::Unknown => text.dimmed().to_string(),
    }
}

pub fn paint_severity(severity: AlertSeverity, color: bool) -> String {
    let text = severity.to_string();
    if !color {
        return text;
    }
    match severity {
        AlertSeverity::Critical => text.red().bold().to_string(),
        AlertSeverity::Warning => text.yellow().to_string(),
        AlertSeverity::Info => text.cyan().to_string(),
        AlertSeverity::Unknown => text.dimmed().to_string(),
    }
}

/// `"87 (healthy)"`, colored by tier.
pub fn paint_health(score: u32, color: bool) -> String {
    let tier = HealthTier::from_score(score);
    let text = format!("{score} ({tier})");
    if !color {
        return text;
    }
    match tier {
        HealthTier::Healthy => text.green().to_string(),
        HealthTier::Warning => text.yellow().to_string(),
        HealthTier::Critical => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                return "(none)".into();
            }
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Aligned `Label:  value` lines for detail views.
pub fn key_values(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    pairs
        .iter()
        .map(|(k, v)| format!("{:<width$} {v}", format!("{k}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("serialization failed: {e}"))
}

pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| format!("serialization failed: {e}"))
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: u64,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Name")]
        name: &'static str,
    }

    fn render(format: OutputFormat) -> String {
        let data = [Item { id: 1, name: "Level A" }, Item { id: 2, name: "Level B" }];
        render_list(
            format,
            &data,
            |i| ItemRow { id: i.id, name: i.name },
            |i| i.id.to_string(),
        )
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        assert_eq!(render(OutputFormat::Plain), "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(
            render(OutputFormat::JsonCompact),
            r#"[{"id":1,"name":"Level A"},{"id":2,"name":"Level B"}]"#
        );
    }

    #[test]
    fn table_has_headers() {
        let table = render(OutputFormat::Table);
        assert!(table.contains("ID"));
        assert!(table.contains("Level B"));
    }

    #[test]
    fn health_is_labelled_by_tier() {
        assert_eq!(paint_health(80, false), "80 (healthy)");
        assert_eq!(paint_health(79, false), "79 (warning)");
        assert_eq!(paint_health(45, false), "45 (critical)");
    }

    #[test]
    fn key_values_align() {
        let out = key_values(&[("Total", "3".into()), ("Occupied", "2".into())]);
        assert_eq!(out, "Total:    3\nOccupied: 2");
    }
}
