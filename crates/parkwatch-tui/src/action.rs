//! All UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parkwatch_core::models::{
    AlertId, AlertListResponse, DashboardSummary, DeviceHealthReport, HourlyUsage, LiveDevice,
    ZonePerformance,
};
use parkwatch_core::{AlertSelection, FilterState, OccupancyCounts, StatusTally};

use crate::screen::ScreenId;

// ── Data snapshots sent by the bridge ────────────────────────────────

/// One consistent read of the live store.
#[derive(Debug, Clone, Default)]
pub struct LiveView {
    pub devices: Arc<Vec<Arc<LiveDevice>>>,
    pub tally: StatusTally,
    pub occupancy: OccupancyCounts,
    pub as_of: Option<DateTime<Utc>>,
}

/// Poller state around the live data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub paused: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertsView {
    pub list: Arc<AlertListResponse>,
    pub selection: AlertSelection,
    pub error: Option<String>,
}

/// Filter bar contents, with ids resolved to names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterView {
    pub state: FilterState,
    pub active_count: usize,
    pub facility_name: Option<String>,
    pub zone_name: Option<String>,
}

// ── Notifications and confirmation ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    BulkAcknowledge { count: usize },
}

impl ConfirmAction {
    /// What a "yes" dispatches.
    pub fn into_action(self) -> Action {
        match self {
            Self::BulkAcknowledge { .. } => Action::AcknowledgeSelected,
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BulkAcknowledge { count } => write!(f, "Acknowledge {count} alert(s)?"),
        }
    }
}

// ── Action ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Data events (bridge → UI) ─────────────────────────────────
    SummaryUpdated(Arc<DashboardSummary>),
    ZonesUpdated(Arc<Vec<ZonePerformance>>),
    LiveUpdated(LiveView),
    LiveStatusChanged(LiveStatus),
    AlertsUpdated(AlertsView),
    HourlyUpdated(Arc<HourlyUsage>),
    HealthUpdated(Arc<DeviceHealthReport>),
    FilterChanged(FilterView),

    // ── Requests (UI → bridge) ────────────────────────────────────
    Refresh,
    ToggleLivePaused,
    CycleFacility,
    CycleZone,
    CycleStatus,
    ClearFilters,
    ToggleAlert(AlertId),
    SelectAllAlerts,
    ClearAlertSelection,
    AcknowledgeAlert(AlertId),
    AcknowledgeSelected,

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}

impl Action {
    /// Whether the data bridge, not the UI, handles this action.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::Refresh
                | Self::ToggleLivePaused
                | Self::CycleFacility
                | Self::CycleZone
                | Self::CycleStatus
                | Self::ClearFilters
                | Self::ToggleAlert(_)
                | Self::SelectAllAlerts
                | Self::ClearAlertSelection
                | Self::AcknowledgeAlert(_)
                | Self::AcknowledgeSelected
        )
    }
}
