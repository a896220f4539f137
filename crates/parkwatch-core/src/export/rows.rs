// Flattening of API records into human-readable export rows.
//
// Every record type yields the same column set no matter how complete the
// data is: missing numbers render as "N/A", missing timestamps as "Never".

use indexmap::IndexMap;
use parkwatch_api::models::{
    Alert, DashboardSummary, DeviceHeartbeat, LiveDevice, ZonePerformance,
};

use crate::health::{HealthTier, format_last_seen};

/// Column name -> cell text, in column order.
pub type ExportRow = IndexMap<String, String>;

pub const NOT_AVAILABLE: &str = "N/A";

pub trait ToExportRow {
    fn to_export_row(&self) -> ExportRow;
}

/// Flatten a slice of records.
pub fn to_rows<T: ToExportRow>(items: &[T]) -> Vec<ExportRow> {
    items.iter().map(ToExportRow::to_export_row).collect()
}

fn row<const N: usize>(cells: [(&str, String); N]) -> ExportRow {
    cells
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |v| format!("{v:.decimals$}"))
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_owned()
}

impl ToExportRow for DeviceHeartbeat {
    fn to_export_row(&self) -> ExportRow {
        row([
            ("Device Code", self.code.clone()),
            ("Facility", self.facility.clone()),
            ("Zone", self.zone.clone()),
            ("Status", self.status.to_string()),
            ("Health Score", self.health_score.to_string()),
            ("Health Tier", HealthTier::from_score(self.health_score).to_string()),
            ("Last Seen", format_last_seen(self.last_seen)),
            ("Active Alerts", self.alerts_count.to_string()),
        ])
    }
}

impl ToExportRow for LiveDevice {
    fn to_export_row(&self) -> ExportRow {
        let telemetry = self.telemetry.as_ref();
        let occupancy = self.parking.as_ref().map_or_else(
            || NOT_AVAILABLE.to_owned(),
            |p| if p.is_occupied { "Occupied" } else { "Vacant" }.to_owned(),
        );
        row([
            ("Device Code", self.code.clone()),
            ("Facility", self.facility.name.clone()),
            ("Zone", self.zone.name.clone()),
            ("Status", self.status.to_string()),
            ("Health Score", self.health_score.to_string()),
            ("Voltage (V)", number(telemetry.and_then(|t| t.voltage), 1)),
            ("Current (A)", number(telemetry.and_then(|t| t.current), 2)),
            ("Power (W)", number(telemetry.and_then(|t| t.power), 2)),
            ("Parking", occupancy),
            ("Last Seen", format_last_seen(self.last_seen)),
            ("Alerts", self.alerts_count.to_string()),
        ])
    }
}

impl ToExportRow for ZonePerformance {
    fn to_export_row(&self) -> ExportRow {
        row([
            ("Zone", self.name.clone()),
            ("Facility", self.facility.clone()),
            ("Devices", self.total_devices.to_string()),
            ("Occupied Slots", self.occupied_slots.to_string()),
            (
                "Daily Capacity",
                self.daily_capacity
                    .map_or_else(|| NOT_AVAILABLE.to_owned(), |c| c.to_string()),
            ),
            ("Utilization (%)", number(self.utilization_percentage, 2)),
            ("Active Alerts", self.active_alerts.to_string()),
        ])
    }
}

impl ToExportRow for Alert {
    fn to_export_row(&self) -> ExportRow {
        row([
            ("ID", self.id.to_string()),
            ("Device Code", self.device_code.clone()),
            ("Facility", self.facility_name.clone()),
            ("Zone", self.zone_name.clone()),
            ("Severity", self.severity.to_string()),
            ("Message", self.message.clone()),
            ("Acknowledged", yes_no(self.acknowledged)),
            ("Created At", format_last_seen(self.created_at)),
        ])
    }
}

impl ToExportRow for DashboardSummary {
    fn to_export_row(&self) -> ExportRow {
        row([
            ("Total Events", self.total_events.to_string()),
            ("Current Occupancy", self.current_occupancy.to_string()),
            ("Active Devices", self.active_devices.to_string()),
            ("Alerts", self.alerts_count.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use parkwatch_api::models::{DeviceStatus, FacilityRef, Telemetry, ZoneRef};
    use pretty_assertions::assert_eq;

    use super::*;

    fn live_device(telemetry: Option<Telemetry>) -> LiveDevice {
        LiveDevice {
            id: 1,
            code: "PK-001".into(),
            zone: ZoneRef {
                id: 1,
                name: "Level A".into(),
            },
            facility: FacilityRef {
                id: 1,
                name: "Downtown".into(),
            },
            status: DeviceStatus::Ok,
            health_score: 90,
            last_seen: None,
            time_since_seen: None,
            telemetry,
            parking: None,
            alerts: Vec::new(),
            alerts_count: 0,
        }
    }

    #[test]
    fn missing_telemetry_uses_sentinels() {
        let row = live_device(None).to_export_row();
        assert_eq!(row["Voltage (V)"], "N/A");
        assert_eq!(row["Power (W)"], "N/A");
        assert_eq!(row["Parking"], "N/A");
        assert_eq!(row["Last Seen"], "Never");
    }

    #[test]
    fn column_set_is_stable() {
        let sparse = live_device(None).to_export_row();
        let full = live_device(Some(Telemetry {
            voltage: Some(230.0),
            current: Some(1.5),
            power: Some(310.5),
            power_factor: Some(0.9),
            timestamp: None,
        }))
        .to_export_row();

        assert_eq!(
            sparse.keys().collect::<Vec<_>>(),
            full.keys().collect::<Vec<_>>()
        );
        assert_eq!(full["Voltage (V)"], "230.0");
        assert_eq!(full["Power (W)"], "310.50");
    }

    #[test]
    fn summary_values_are_verbatim() {
        let row = DashboardSummary {
            total_events: 120,
            current_occupancy: 40,
            active_devices: 8,
            alerts_count: 2,
        }
        .to_export_row();
        assert_eq!(
            row.values().cloned().collect::<Vec<_>>(),
            vec!["120", "40", "8", "2"]
        );
    }
}
