//! Device heartbeat table.

use parkwatch_core::health::format_last_seen;
use parkwatch_core::models::{DeviceHeartbeat, DeviceStatus};
use parkwatch_core::{FilterKey, Monitor};
use tabled::Tabled;

use crate::cli::{DeviceStatusArg, DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
    #[tabled(rename = "Alerts")]
    alerts: usize,
}

fn row(d: &DeviceHeartbeat, color: bool) -> DeviceRow {
    DeviceRow {
        code: d.code.clone(),
        facility: d.facility.clone(),
        zone: d.zone.clone(),
        status: output::paint_status(d.status, color),
        health: output::paint_health(d.health_score, color),
        last_seen: format_last_seen(d.last_seen),
        alerts: d.active_alerts.len(),
    }
}

fn status_param(status: DeviceStatusArg) -> DeviceStatus {
    match status {
        DeviceStatusArg::Ok => DeviceStatus::Ok,
        DeviceStatusArg::Warning => DeviceStatus::Warning,
        DeviceStatusArg::Critical => DeviceStatus::Critical,
    }
}

pub async fn handle(monitor: &Monitor, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut filter = util::monitor_filter(&args.filter, monitor);
    if let Some(status) = args.status {
        filter.update(FilterKey::Status, status_param(status).to_string());
    }

    let devices = monitor.devices_heartbeat(&filter.to_query()).await?;
    let color = util::color(global);
    let out = output::render_list(global.output, &devices, |d| row(d, color), |d| d.code.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
