//! Live device status, once or continuously (`--watch`).

use std::io::IsTerminal;
use std::time::Duration;

use parkwatch_core::health::{format_elapsed, format_last_seen};
use parkwatch_core::models::LiveDevice;
use parkwatch_core::{ListQuery, LiveStore, Monitor, MonitorConfig};
use tabled::Tabled;
use tracing::debug;

use crate::cli::{GlobalOpts, LiveArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LiveRow {
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
    #[tabled(rename = "Parking")]
    parking: String,
    #[tabled(rename = "Power (W)")]
    power: String,
    #[tabled(rename = "Last Seen")]
    seen: String,
    #[tabled(rename = "Alerts")]
    alerts: u64,
}

fn row(d: &LiveDevice, color: bool) -> LiveRow {
    LiveRow {
        code: d.code.clone(),
        facility: d.facility.name.clone(),
        zone: d.zone.name.clone(),
        status: output::paint_status(d.status, color),
        health: output::paint_health(d.health_score, color),
        parking: match d.parking.as_ref().map(|p| p.is_occupied) {
            Some(true) => "Occupied".into(),
            Some(false) => "Vacant".into(),
            None => "-".into(),
        },
        power: d
            .telemetry
            .as_ref()
            .and_then(|t| t.power)
            .map_or_else(|| "-".into(), |p| format!("{p:.1}")),
        seen: format_elapsed(d.time_since_seen),
        alerts: d.alerts_count,
    }
}

/// Header line plus device table, all read from the store so the counts
/// always match the rows. Structured formats get the devices only.
fn render_store(store: &LiveStore, global: &GlobalOpts) -> String {
    let devices = store.devices_snapshot();
    let color = util::color(global);
    let listing = output::render_list(
        global.output,
        devices.as_slice(),
        |d| row(d, color),
        |d| d.code.clone(),
    );
    if global.output != OutputFormat::Table {
        return listing;
    }

    let tally = store.status_tally();
    let occupancy = store.occupancy();
    let header = format!(
        "Last updated: {}  |  {} devices: OK {}, WARNING {}, CRITICAL {}  |  Occupied {}, Vacant {}",
        format_last_seen(store.as_of()),
        tally.total(),
        tally.ok,
        tally.warning,
        tally.critical,
        occupancy.occupied,
        occupancy.vacant,
    );
    format!("{header}\n{listing}")
}

pub async fn handle(monitor: &Monitor, args: LiveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = util::monitor_filter(&args.filter, monitor).to_query();

    if !args.watch {
        monitor.live_once(&query).await?;
        output::print_output(&render_store(monitor.store(), global), global.quiet);
        return Ok(());
    }

    let interval = args
        .interval
        .map_or(monitor.config().poll_interval, Duration::from_secs);
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "--watch needs an interval of at least 1 second".into(),
        });
    }

    let watcher = Monitor::new(MonitorConfig {
        poll_interval: interval,
        ..monitor.config().clone()
    })?;
    watch(&watcher, query, global).await;
    watcher.shutdown();
    Ok(())
}

async fn watch(monitor: &Monitor, query: ListQuery, global: &GlobalOpts) {
    let mut devices = monitor.store().subscribe_devices();
    let mut state = monitor.start_live(query).await;
    let clear = std::io::stdout().is_terminal() && global.output == OutputFormat::Table;
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted, stopping live watch");
                break;
            }
            changed = devices.changed() => {
                if changed.is_none() {
                    break;
                }
                if clear {
                    print!("\x1b[2J\x1b[H");
                }
                output::print_output(&render_store(monitor.store(), global), global.quiet);
            }
            res = state.changed() => {
                if res.is_err() {
                    break;
                }
                let error = state.borrow_and_update().error.clone();
                if error != last_error {
                    if let Some(ref message) = error {
                        eprintln!("Live update failed: {message} (showing last good data)");
                    }
                    last_error = error;
                }
            }
        }
    }

    monitor.stop_live().await;
}
