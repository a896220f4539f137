// ── Health and status derivations ──
//
// Pure helpers shared by the CLI tables, the TUI and the export rows.

use chrono::{DateTime, Utc};
use parkwatch_api::models::{DeviceStatus, LiveDevice};
use serde::Serialize;
use strum::{Display, EnumString};

pub const HEALTHY_THRESHOLD: u32 = 80;
pub const WARNING_THRESHOLD: u32 = 50;

/// Sentinel for timestamps that were never reported.
pub const NEVER: &str = "Never";

/// Colour tier of a 0-100 health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    /// `>= 80` healthy, `>= 50` warning, below that critical.
    pub fn from_score(score: u32) -> Self {
        if score >= HEALTHY_THRESHOLD {
            Self::Healthy
        } else if score >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

/// Device counts per heartbeat status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub ok: usize,
    pub warning: usize,
    pub critical: usize,
    pub unknown: usize,
}

impl StatusTally {
    pub fn from_statuses(statuses: impl IntoIterator<Item = DeviceStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut tally, status| {
            match status {
                DeviceStatus::Ok => tally.ok += 1,
                DeviceStatus::Warning => tally.warning += 1,
                DeviceStatus::Critical => tally.critical += 1,
                DeviceStatus::Unknown => tally.unknown += 1,
            }
            tally
        })
    }

    pub fn from_devices<'a>(devices: impl IntoIterator<Item = &'a LiveDevice>) -> Self {
        Self::from_statuses(devices.into_iter().map(|d| d.status))
    }

    pub fn total(&self) -> usize {
        self.ok + self.warning + self.critical + self.unknown
    }
}

/// Parking occupancy across a set of devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OccupancyCounts {
    pub occupied: usize,
    pub vacant: usize,
    /// Devices that have not reported a parking reading yet.
    pub unknown: usize,
}

pub fn occupancy_counts<'a>(devices: impl IntoIterator<Item = &'a LiveDevice>) -> OccupancyCounts {
    devices
        .into_iter()
        .fold(OccupancyCounts::default(), |mut counts, device| {
            match device.parking.as_ref().map(|p| p.is_occupied) {
                Some(true) => counts.occupied += 1,
                Some(false) => counts.vacant += 1,
                None => counts.unknown += 1,
            }
            counts
        })
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, or "Never".
pub fn format_last_seen(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || NEVER.to_owned(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Compact elapsed time such as `45s ago`, `3m ago`, `2h 5m ago`.
pub fn format_elapsed(seconds: Option<u64>) -> String {
    let Some(secs) = seconds else {
        return NEVER.to_owned();
    };
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h {}m ago", secs / 3600, (secs % 3600) / 60),
        _ => format!("{}d ago", secs / 86_400),
    }
}
