//! Dashboard summary cards.

use chrono::Local;
use parkwatch_core::Monitor;
use parkwatch_core::models::DashboardSummary;

use crate::cli::{GlobalOpts, SummaryArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &DashboardSummary) -> String {
    output::key_values(&[
        ("Total Events", s.total_events.to_string()),
        ("Current Occupancy", s.current_occupancy.to_string()),
        ("Active Devices", s.active_devices.to_string()),
        ("Alerts", s.alerts_count.to_string()),
    ])
}

pub async fn handle(monitor: &Monitor, args: SummaryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let date = match args.date {
        Some(ref value) => util::parse_date(value)?,
        None => Local::now().date_naive(),
    };

    let summary = monitor.summary(date).await?;
    let out = output::render_single(global.output, &summary, detail, |s| {
        format!(
            "{} {} {} {}",
            s.total_events, s.current_occupancy, s.active_devices, s.alerts_count
        )
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
