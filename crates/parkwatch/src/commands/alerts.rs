//! Alert listing and acknowledgement.

use parkwatch_core::health::format_last_seen;
use parkwatch_core::models::{Alert, AlertSeverity};
use parkwatch_core::{AlertBoard, FilterKey, ListQuery, Monitor};
use tabled::Tabled;

use crate::cli::{
    AlertFilterArgs, AlertSortArg, AlertsArgs, AlertsCommand, GlobalOpts, OutputFormat, SeverityArg,
    SortOrderArg,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Ack")]
    ack: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn row(a: &Alert, color: bool) -> AlertRow {
    AlertRow {
        id: a.id,
        severity: output::paint_severity(a.severity, color),
        device: a.device_code.clone(),
        facility: a.facility_name.clone(),
        zone: a.zone_name.clone(),
        message: a.message.clone(),
        // Only unacknowledged alerts get a checkbox.
        ack: if a.acknowledged { "yes".into() } else { "[ ]".into() },
        created: format_last_seen(a.created_at),
    }
}

// ── Filter translation ──────────────────────────────────────────────

fn severity_param(severity: SeverityArg) -> AlertSeverity {
    match severity {
        SeverityArg::Critical => AlertSeverity::Critical,
        SeverityArg::Warning => AlertSeverity::Warning,
        SeverityArg::Info => AlertSeverity::Info,
    }
}

fn alert_query(args: &AlertFilterArgs, monitor: &Monitor) -> ListQuery {
    let mut filter = util::monitor_filter(&args.scope, monitor);
    if let Some(severity) = args.severity {
        filter.update(FilterKey::Severity, severity_param(severity).to_string());
    }
    if let Some(acknowledged) = args.acknowledged {
        filter.update(FilterKey::Acknowledged, acknowledged.to_string());
    }
    if let Some(sort) = args.sort_by {
        let field = match sort {
            AlertSortArg::CreatedAt => "created_at",
            AlertSortArg::Severity => "severity",
        };
        filter.update(FilterKey::SortBy, field);
    }
    if let Some(order) = args.order {
        let dir = match order {
            SortOrderArg::Asc => "asc",
            SortOrderArg::Desc => "desc",
        };
        filter.update(FilterKey::Order, dir);
    }

    let query = filter.to_query();
    if args.inactive { query.is_active(false) } else { query }
}

fn selection_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "ids".into(),
        reason: e.to_string(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = util::color(global);

    match args.command {
        AlertsCommand::List(filter) => {
            let list = monitor.alerts(&alert_query(&filter, monitor)).await?;
            let out = output::render_list(global.output, &list.alerts, |a| row(a, color), |a| a.id.to_string());
            output::print_output(&out, global.quiet);
            if global.output == OutputFormat::Table && !global.quiet {
                let counts = &list.severity_counts;
                eprintln!(
                    "{} alerts, {} unacknowledged (critical {}, warning {}, info {})",
                    list.total, list.unacknowledged, counts.critical, counts.warning, counts.info
                );
            }
            Ok(())
        }

        AlertsCommand::Ack { id } => {
            let alert = monitor.acknowledge_alert(id).await?;
            let out = output::render_single(
                global.output,
                &alert,
                |a| {
                    output::key_values(&[
                        ("ID", a.id.to_string()),
                        ("Severity", output::paint_severity(a.severity, color)),
                        ("Device", a.device_code.clone()),
                        ("Message", a.message.clone()),
                        ("Acknowledged", a.acknowledged.to_string()),
                    ])
                },
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::BulkAck { ids, all, filter } => {
            let mut board = AlertBoard::new(monitor.client().clone(), alert_query(&filter, monitor));
            board.refresh().await?;

            if all {
                board.select_all();
            } else {
                for id in ids {
                    board.select(id).map_err(selection_err)?;
                }
            }

            let count = board.selection().len();
            if count > 0 {
                let prompt = format!("Acknowledge {count} alert(s)?");
                if !util::confirm(&prompt, "bulk acknowledge", global.yes)? {
                    return Ok(());
                }
            }

            let acknowledged = board.acknowledge_selected().await?;
            if !global.quiet {
                eprintln!("Acknowledged {acknowledged} alert(s)");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parkwatch_core::MonitorConfig;

    fn monitor() -> Monitor {
        Monitor::new(MonitorConfig::default()).unwrap()
    }

    #[test]
    fn alert_flags_become_query_params() {
        let args = AlertFilterArgs {
            severity: Some(SeverityArg::Critical),
            acknowledged: Some(false),
            inactive: true,
            sort_by: Some(AlertSortArg::CreatedAt),
            order: Some(SortOrderArg::Desc),
            ..AlertFilterArgs::default()
        };
        let query = alert_query(&args, &monitor());

        assert_eq!(query.get("severity"), Some("CRITICAL"));
        assert_eq!(query.get("acknowledged"), Some("false"));
        assert_eq!(query.get("is_active"), Some("false"));
        assert_eq!(query.get("sort_by"), Some("created_at"));
        assert_eq!(query.get("order"), Some("desc"));
    }

    #[test]
    fn no_flags_means_active_alerts_only() {
        let query = alert_query(&AlertFilterArgs::default(), &monitor());
        assert!(query.is_empty());
    }
}
