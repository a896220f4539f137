//! Export tables to CSV, Excel or PDF files.

use std::path::PathBuf;

use chrono::Local;
use parkwatch_core::export::{self, ExportFormat, ExportOutcome, ExportRow, NO_DATA_MESSAGE, Sheet};
use parkwatch_core::{ListQuery, Monitor};

use crate::cli::{ExportArgs, ExportFormatArg, ExportTarget, GlobalOpts};
use crate::error::CliError;

use super::util;

fn format_of(arg: ExportFormatArg) -> ExportFormat {
    match arg {
        ExportFormatArg::Csv => ExportFormat::Csv,
        ExportFormatArg::Excel => ExportFormat::Excel,
        ExportFormatArg::Pdf => ExportFormat::Pdf,
    }
}

/// File stem and document title for each target.
fn naming(target: ExportTarget) -> (&'static str, &'static str) {
    match target {
        ExportTarget::Devices => ("devices", "Device Heartbeat"),
        ExportTarget::Live => ("live_status", "Live Device Status"),
        ExportTarget::Zones => ("zones", "Zone Performance"),
        ExportTarget::Alerts => ("alerts", "Alerts"),
        ExportTarget::Summary => ("summary", "Dashboard Summary"),
        ExportTarget::All => ("parkwatch_report", "Parking Monitor Report"),
    }
}

async fn fetch_rows(monitor: &Monitor, target: ExportTarget, query: &ListQuery) -> Result<Vec<ExportRow>, CliError> {
    let rows = match target {
        ExportTarget::Devices => export::to_rows(&monitor.devices_heartbeat(query).await?),
        ExportTarget::Live => export::to_rows(&monitor.live_once(query).await?.devices),
        ExportTarget::Zones => export::to_rows(&monitor.zones_performance(query).await?),
        ExportTarget::Alerts => export::to_rows(&monitor.alerts(query).await?.alerts),
        ExportTarget::Summary => {
            let summary = monitor.summary(Local::now().date_naive()).await?;
            export::to_rows(std::slice::from_ref(&summary))
        }
        ExportTarget::All => {
            return Err(CliError::Internal("workbook targets are fetched per sheet".into()));
        }
    };
    Ok(rows)
}

pub async fn handle(monitor: &Monitor, args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let format = format_of(args.format);
    let (stem, title) = naming(args.target);
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(export::file_name(stem, format, Local::now().date_naive())));
    let query = util::monitor_filter(&args.filter, monitor).to_query();

    let bar = util::spinner(&format!("Exporting {title}..."), global.quiet);
    let outcome = if args.target == ExportTarget::All {
        if format != ExportFormat::Excel {
            bar.finish_and_clear();
            return Err(CliError::Validation {
                field: "format".into(),
                reason: "exporting all tables needs --format excel".into(),
            });
        }
        let targets = [
            (ExportTarget::Devices, "Devices"),
            (ExportTarget::Live, "Live Status"),
            (ExportTarget::Zones, "Zones"),
            (ExportTarget::Alerts, "Alerts"),
            (ExportTarget::Summary, "Summary"),
        ];
        let mut tables = Vec::with_capacity(targets.len());
        for (target, name) in targets {
            tables.push((name, fetch_rows(monitor, target, &query).await?));
        }
        let sheets: Vec<Sheet<'_>> = tables
            .iter()
            .map(|(name, rows)| Sheet { name, rows })
            .collect();
        export::export_workbook(&sheets, &path)
    } else {
        let rows = fetch_rows(monitor, args.target, &query).await?;
        export::export_table(format, &rows, title, &path)
    };
    bar.finish_and_clear();

    match outcome? {
        ExportOutcome::Written { path, rows } => {
            if !global.quiet {
                eprintln!("Wrote {rows} row(s) to {}", path.display());
            }
        }
        ExportOutcome::NoData => eprintln!("{NO_DATA_MESSAGE}"),
        ExportOutcome::Skipped { format } => eprintln!("Unsupported export format: {format}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_names_follow_target_and_format() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default();
        let (stem, _) = naming(ExportTarget::Live);
        assert_eq!(
            export::file_name(stem, format_of(ExportFormatArg::Excel), date),
            "live_status_2024-03-09.xlsx"
        );
    }
}
