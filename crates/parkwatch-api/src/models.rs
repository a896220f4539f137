// Monitoring backend response types
//
// Transport DTOs for every endpoint the dashboard consumes. The backend is
// not strict about field presence (telemetry and parking snapshots are null
// until a device first reports), so optional fields default liberally and
// unknown enum strings land in an `Unknown` variant instead of failing the
// whole payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub type FacilityId = u64;
pub type ZoneId = u64;
pub type DeviceId = u64;
pub type AlertId = u64;

// ── Enums ────────────────────────────────────────────────────────────

/// Heartbeat-derived device status, computed server-side from the time
/// since the device was last seen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DeviceStatus {
    Ok,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

/// Alert severity level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

// ── Dashboard ────────────────────────────────────────────────────────

/// Date-scoped aggregate from `dashboard/summary/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub current_occupancy: u64,
    #[serde(default)]
    pub active_devices: u64,
    #[serde(default)]
    pub alerts_count: u64,
}

/// Per-zone metrics from `dashboard/zones-performances/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePerformance {
    pub id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub facility_id: Option<FacilityId>,
    #[serde(default)]
    pub total_devices: u64,
    #[serde(default)]
    pub occupied_slots: u64,
    #[serde(default)]
    pub daily_capacity: Option<u64>,
    #[serde(default)]
    pub utilization_percentage: Option<f64>,
    #[serde(default)]
    pub active_alerts: u64,
}

/// Short alert view embedded in device payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertBrief {
    pub severity: AlertSeverity,
    #[serde(default)]
    pub message: String,
}

/// Device row from `dashboard/devices-hearbeat/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHeartbeat {
    #[serde(default)]
    pub id: Option<DeviceId>,
    pub code: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub facility_id: Option<FacilityId>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub status: DeviceStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub health_score: u32,
    #[serde(default)]
    pub active_alerts: Vec<AlertBrief>,
    #[serde(default)]
    pub alerts_count: u64,
}

// ── Live monitoring ──────────────────────────────────────────────────

/// `{id, name}` reference to a zone, as nested in live payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRef {
    pub id: ZoneId,
    pub name: String,
}

/// `{id, name}` reference to a facility, as nested in live payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRef {
    pub id: FacilityId,
    pub name: String,
}

/// Latest electrical reading for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(default)]
    pub power_factor: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Latest occupancy reading for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSnapshot {
    pub is_occupied: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Device row from `devices/live-status/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDevice {
    pub id: DeviceId,
    pub code: String,
    pub zone: ZoneRef,
    pub facility: FacilityRef,
    pub status: DeviceStatus,
    #[serde(default)]
    pub health_score: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Seconds since the device last reported; `None` when never seen.
    #[serde(default)]
    pub time_since_seen: Option<u64>,
    #[serde(default)]
    pub telemetry: Option<Telemetry>,
    #[serde(default)]
    pub parking: Option<ParkingSnapshot>,
    #[serde(default)]
    pub alerts: Vec<AlertBrief>,
    #[serde(default)]
    pub alerts_count: u64,
}

/// Full payload of `devices/live-status/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatusResponse {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub devices: Vec<LiveDevice>,
    #[serde(default)]
    pub total_devices: u64,
}

// ── Facilities ───────────────────────────────────────────────────────

/// A parking zone. `facility_id` is only present on the secondary
/// per-facility zone listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub facility_id: Option<FacilityId>,
    #[serde(default)]
    pub daily_capacity: Option<u64>,
}

/// A facility. `zones` is `None` when the backend does not nest them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(default)]
    pub zones: Option<Vec<Zone>>,
    #[serde(default)]
    pub zones_count: Option<u64>,
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(default)]
    pub device_code: String,
    #[serde(default)]
    pub facility_name: String,
    #[serde(default)]
    pub zone_name: String,
    #[serde(default)]
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(default, rename = "INFO")]
    pub info: u64,
    #[serde(default, rename = "WARNING")]
    pub warning: u64,
    #[serde(default, rename = "CRITICAL")]
    pub critical: u64,
}

/// Payload of `alerts/`: the filtered list plus summary stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertListResponse {
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub acknowledged: u64,
    #[serde(default)]
    pub unacknowledged: u64,
    #[serde(default)]
    pub severity_counts: SeverityCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAcknowledgeResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub acknowledged_count: u64,
}

// ── Analytics ────────────────────────────────────────────────────────

/// Reporting window. Hourly reports use timestamps, trend reports use
/// plain dates, so both ends stay as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub hour: String,
    #[serde(default)]
    pub hour_label: String,
    #[serde(default)]
    pub occupied: u64,
    #[serde(default)]
    pub vacant: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySummary {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub avg_occupancy_rate: f64,
}

/// Payload of `analytics/hourly-usage/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUsage {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub hourly_data: Vec<HourlyBucket>,
    #[serde(default)]
    pub summary: HourlySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: String,
    #[serde(default)]
    pub date_label: String,
    #[serde(default)]
    pub total_parking: u64,
    #[serde(default)]
    pub occupied: u64,
    #[serde(default)]
    pub vacant: u64,
    #[serde(default)]
    pub avg_occupancy: f64,
    #[serde(default)]
    pub peak_occupancy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub avg_occupancy: f64,
}

/// Payload of `analytics/occupancy-trend/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyTrend {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub daily_data: Vec<DailyBucket>,
    #[serde(default)]
    pub summary: TrendSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCategories {
    #[serde(default)]
    pub healthy: u64,
    #[serde(default)]
    pub warning: u64,
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub offline: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    #[serde(default)]
    pub total_devices: u64,
    #[serde(default)]
    pub average_health: f64,
    #[serde(default)]
    pub healthy_percentage: f64,
}

/// Per-device row of the health report. `status` is the report's own
/// lower-case category (`healthy`, `warning`, `critical`, `offline`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHealthEntry {
    pub device_code: String,
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub health_score: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Payload of `analytics/device-health/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHealthReport {
    #[serde(default)]
    pub device_categories: HealthCategories,
    #[serde(default)]
    pub metrics: HealthMetrics,
    #[serde(default)]
    pub devices: Vec<DeviceHealthEntry>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_does_not_fail_payload() {
        let device: DeviceHeartbeat = serde_json::from_value(json!({
            "code": "DEV-1",
            "status": "REBOOTING",
        }))
        .unwrap();
        assert_eq!(device.status, DeviceStatus::Unknown);
        assert!(device.last_seen.is_none());
        assert!(device.active_alerts.is_empty());
    }

    #[test]
    fn live_device_tolerates_null_snapshots() {
        let device: LiveDevice = serde_json::from_value(json!({
            "id": 4,
            "code": "PK-004",
            "zone": {"id": 2, "name": "Level B"},
            "facility": {"id": 1, "name": "Downtown"},
            "status": "CRITICAL",
            "health_score": 80,
            "last_seen": null,
            "time_since_seen": null,
            "telemetry": null,
            "parking": null,
            "alerts": [],
            "alerts_count": 0
        }))
        .unwrap();
        assert!(device.telemetry.is_none());
        assert!(device.parking.is_none());
        assert_eq!(device.zone.name, "Level B");
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("critical".parse::<AlertSeverity>().unwrap(), AlertSeverity::Critical);
        assert_eq!(AlertSeverity::Warning.to_string(), "WARNING");
        assert_eq!("ok".parse::<DeviceStatus>().unwrap(), DeviceStatus::Ok);
        assert!("rebooting".parse::<DeviceStatus>().is_err());
    }

    #[test]
    fn severity_counts_use_wire_keys() {
        let counts: SeverityCounts =
            serde_json::from_value(json!({"INFO": 1, "WARNING": 2, "CRITICAL": 3})).unwrap();
        assert_eq!((counts.info, counts.warning, counts.critical), (1, 2, 3));
    }

    #[test]
    fn facility_without_nested_zones() {
        let facility: Facility = serde_json::from_value(json!({"id": 3, "name": "Airport"})).unwrap();
        assert!(facility.zones.is_none());
    }
}
