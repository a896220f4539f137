//! Zone performance table.

use parkwatch_core::Monitor;
use parkwatch_core::export::NOT_AVAILABLE;
use parkwatch_core::models::ZonePerformance;
use tabled::Tabled;

use crate::cli::{FilterArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Devices")]
    devices: u64,
    #[tabled(rename = "Occupied")]
    occupied: u64,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
    #[tabled(rename = "Alerts")]
    alerts: u64,
}

impl From<&ZonePerformance> for ZoneRow {
    fn from(z: &ZonePerformance) -> Self {
        Self {
            id: z.id,
            name: z.name.clone(),
            facility: z.facility.clone(),
            devices: z.total_devices,
            occupied: z.occupied_slots,
            capacity: z
                .daily_capacity
                .map_or_else(|| NOT_AVAILABLE.into(), |c| c.to_string()),
            utilization: z
                .utilization_percentage
                .map_or_else(|| NOT_AVAILABLE.into(), |u| format!("{u:.1}%")),
            alerts: z.active_alerts,
        }
    }
}

pub async fn handle(monitor: &Monitor, filter: &FilterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = util::monitor_filter(filter, monitor).to_query();
    let zones = monitor.zones_performance(&query).await?;

    let out = output::render_list(global.output, &zones, |z| ZoneRow::from(z), |z| z.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
