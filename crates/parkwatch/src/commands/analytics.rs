//! Occupancy and device-health analytics.

use parkwatch_core::health::format_last_seen;
use parkwatch_core::models::{DailyBucket, DeviceHealthEntry, HourlyBucket};
use parkwatch_core::Monitor;
use tabled::Tabled;

use crate::cli::{AnalyticsArgs, AnalyticsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct HourRow {
    #[tabled(rename = "Hour")]
    hour: String,
    #[tabled(rename = "Occupied")]
    occupied: u64,
    #[tabled(rename = "Vacant")]
    vacant: u64,
    #[tabled(rename = "Events")]
    events: u64,
    #[tabled(rename = "Occupancy")]
    rate: String,
}

impl From<&HourlyBucket> for HourRow {
    fn from(b: &HourlyBucket) -> Self {
        Self {
            hour: if b.hour_label.is_empty() { b.hour.clone() } else { b.hour_label.clone() },
            occupied: b.occupied,
            vacant: b.vacant,
            events: b.total_events,
            rate: format!("{:.1}%", b.occupancy_rate),
        }
    }
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Events")]
    events: u64,
    #[tabled(rename = "Occupied")]
    occupied: u64,
    #[tabled(rename = "Vacant")]
    vacant: u64,
    #[tabled(rename = "Avg")]
    avg: String,
    #[tabled(rename = "Peak")]
    peak: String,
}

impl From<&DailyBucket> for DayRow {
    fn from(d: &DailyBucket) -> Self {
        Self {
            date: if d.date_label.is_empty() { d.date.clone() } else { d.date_label.clone() },
            events: d.total_parking,
            occupied: d.occupied,
            vacant: d.vacant,
            avg: format!("{:.1}%", d.avg_occupancy),
            peak: format!("{:.1}%", d.peak_occupancy),
        }
    }
}

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn health_row(d: &DeviceHealthEntry, color: bool) -> HealthRow {
    HealthRow {
        device: d.device_code.clone(),
        facility: d.facility.clone(),
        zone: d.zone.clone(),
        health: output::paint_health(d.health_score, color),
        status: d.status.clone(),
        last_seen: format_last_seen(d.last_seen),
    }
}

/// Trailing summary lines go to stderr so piped table output stays clean.
fn footer(global: &GlobalOpts, text: &str) {
    if global.output == OutputFormat::Table && !global.quiet {
        eprintln!("{text}");
    }
}

pub async fn handle(monitor: &Monitor, args: AnalyticsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AnalyticsCommand::Hourly(filter) => {
            let query = util::monitor_filter(&filter, monitor).to_query();
            let usage = monitor.hourly_usage(&query).await?;
            let out = output::render_list(global.output, &usage.hourly_data, |b| HourRow::from(b), |b| b.hour.clone());
            output::print_output(&out, global.quiet);
            footer(
                global,
                &format!(
                    "{} to {}: {} events, average occupancy {:.1}%",
                    usage.period.start, usage.period.end, usage.summary.total_events, usage.summary.avg_occupancy_rate
                ),
            );
        }

        AnalyticsCommand::Trend { filter, days } => {
            let query = util::monitor_filter(&filter, monitor).to_query().days(days);
            let trend = monitor.occupancy_trend(&query).await?;
            let out = output::render_list(global.output, &trend.daily_data, |d| DayRow::from(d), |d| d.date.clone());
            output::print_output(&out, global.quiet);
            footer(
                global,
                &format!(
                    "{} to {}: {} events, average occupancy {:.1}%",
                    trend.period.start, trend.period.end, trend.summary.total_events, trend.summary.avg_occupancy
                ),
            );
        }

        AnalyticsCommand::Health(filter) => {
            let query = util::monitor_filter(&filter, monitor).to_query();
            let report = monitor.device_health(&query).await?;
            if global.output != OutputFormat::Table {
                let out = output::render_single(global.output, &report, |_| String::new(), |r| {
                    r.devices.iter().map(|d| d.device_code.clone()).collect::<Vec<_>>().join("\n")
                });
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            let color = util::color(global);
            let c = &report.device_categories;
            let m = &report.metrics;
            let summary = output::key_values(&[
                ("Devices", m.total_devices.to_string()),
                ("Average Health", format!("{:.1}", m.average_health)),
                ("Healthy", format!("{} ({:.1}%)", c.healthy, m.healthy_percentage)),
                ("Warning", c.warning.to_string()),
                ("Critical", c.critical.to_string()),
                ("Offline", c.offline.to_string()),
            ]);
            let table = output::render_list(global.output, &report.devices, |d| health_row(d, color), |d| d.device_code.clone());
            output::print_output(&format!("{summary}\n\n{table}"), global.quiet);
        }
    }
    Ok(())
}
