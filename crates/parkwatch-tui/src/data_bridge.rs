//! Data bridge: owns the [`Monitor`] and everything that talks to the API.
//!
//! Runs as a background task. Request actions arrive from the app on one
//! channel; data snapshots, poller state and notifications go back as
//! [`Action`]s. The [`FilterStore`] change listener feeds a channel the run
//! loop drains: every filter transition re-fetches the views that depend on
//! it and restarts the live poller with the new query.

use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;
use parkwatch_core::models::{DeviceStatus, FacilityId, ZoneId};
use parkwatch_core::{
    AlertBoard, ApiClient, CoreError, FacilityLookup, FilterKey, FilterState, FilterStore,
    ListQuery, LiveState, Monitor,
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{Action, AlertsView, FilterView, LiveStatus, LiveView, Notification};

/// Status filter values in cycling order.
const STATUSES: [DeviceStatus; 3] = [DeviceStatus::Ok, DeviceStatus::Warning, DeviceStatus::Critical];

/// Next option after `current`; unset goes to the first option and the last
/// option goes back to unset.
pub fn cycle<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    match current.and_then(|c| options.iter().position(|o| *o == c)) {
        None => options.first().copied(),
        Some(i) => options.get(i + 1).copied(),
    }
}

fn parse_id(value: &str) -> Option<u64> {
    value.parse().ok()
}

struct Bridge {
    monitor: Monitor,
    tx: mpsc::UnboundedSender<Action>,
    filters: FilterStore,
    lookup: FacilityLookup<ApiClient>,
    alerts: AlertBoard<ApiClient>,
    /// Every state the filter store transitioned to, in order.
    filter_changes: mpsc::UnboundedReceiver<FilterState>,
    paused: bool,
}

impl Bridge {
    fn new(monitor: Monitor, tx: mpsc::UnboundedSender<Action>) -> Self {
        let config = monitor.config();
        let seed = FilterState {
            facility: config.facility.map(|id| id.to_string()).unwrap_or_default(),
            zone: config.zone.map(|id| id.to_string()).unwrap_or_default(),
            ..FilterState::default()
        };
        let mut filters = FilterStore::new(seed);
        let (filter_tx, filter_changes) = mpsc::unbounded_channel();
        filters.on_change(move |state| {
            let _ = filter_tx.send(state.clone());
        });
        let client = monitor.client().clone();

        Self {
            lookup: FacilityLookup::new(client.clone()),
            alerts: AlertBoard::new(client, filters.to_query()),
            filters,
            filter_changes,
            monitor,
            tx,
            paused: false,
        }
    }

    fn send(&self, action: Action) {
        let _ = self.tx.send(action);
    }

    fn notify_err(&self, what: &str, e: &CoreError) {
        warn!(what, error = %e, "request failed");
        self.send(Action::Notify(Notification::error(format!(
            "{what}: {}",
            e.display_message()
        ))));
    }

    fn query(&self) -> ListQuery {
        self.filters.to_query()
    }

    // ── Filters ──────────────────────────────────────────────────

    fn selected_facility(&self) -> Option<FacilityId> {
        parse_id(&self.filters.current().facility)
    }

    fn selected_zone(&self) -> Option<ZoneId> {
        parse_id(&self.filters.current().zone)
    }

    fn emit_filter(&self, state: &FilterState) {
        let facility_name = parse_id(&state.facility)
            .map(|id| self.lookup.facility(id).map_or_else(|| format!("#{id}"), |f| f.name.clone()));
        let zone_name = parse_id(&state.zone)
            .map(|id| self.lookup.zone(id).map_or_else(|| format!("#{id}"), |z| z.name.clone()));

        self.send(Action::FilterChanged(FilterView {
            state: state.clone(),
            active_count: state.active_count(),
            facility_name,
            zone_name,
        }));
    }

    async fn load_facilities(&mut self) {
        self.lookup.load().await;
        if let Some(message) = self.lookup.facilities_error() {
            self.send(Action::Notify(Notification::error(format!("Facilities: {message}"))));
        }
        let selected = self.selected_facility();
        self.lookup.select_facility(selected).await;
    }

    async fn cycle_facility(&mut self) {
        let ids: Vec<FacilityId> = self.lookup.facilities().iter().map(|f| f.id).collect();
        if ids.is_empty() {
            self.send(Action::Notify(Notification::warning("No facilities loaded")));
            return;
        }
        let next = cycle(self.selected_facility(), &ids);
        self.filters
            .update(FilterKey::Facility, next.map(|id| id.to_string()).unwrap_or_default());
        self.lookup.select_facility(next).await;
        if let Some(message) = self.lookup.zones_error() {
            self.send(Action::Notify(Notification::error(format!("Zones: {message}"))));
        }
    }

    fn cycle_zone(&mut self) {
        if self.selected_facility().is_none() {
            self.send(Action::Notify(Notification::info("Pick a facility first (f)")));
            return;
        }
        let ids: Vec<ZoneId> = self.lookup.zones().iter().map(|z| z.id).collect();
        if ids.is_empty() {
            self.send(Action::Notify(Notification::info("This facility has no zones")));
            return;
        }
        let next = cycle(self.selected_zone(), &ids);
        self.filters
            .update(FilterKey::Zone, next.map(|id| id.to_string()).unwrap_or_default());
    }

    fn cycle_status(&mut self) {
        let current = self.filters.current().status.parse::<DeviceStatus>().ok();
        let next = cycle(current, &STATUSES);
        self.filters
            .update(FilterKey::Status, next.map(|s| s.to_string()).unwrap_or_default());
    }

    async fn clear_filters(&mut self) {
        self.filters.reset();
        let selected = self.selected_facility();
        self.lookup.select_facility(selected).await;
    }

    // ── Fetching ─────────────────────────────────────────────────

    async fn fetch_summary(&mut self) {
        match self.monitor.summary(Local::now().date_naive()).await {
            Ok(summary) => self.send(Action::SummaryUpdated(Arc::new(summary))),
            Err(e) => self.notify_err("Summary", &e),
        }
    }

    async fn fetch_alerts(&mut self) {
        self.alerts.set_query(self.query());
        let refreshed = self.alerts.refresh().await.map(|_| ());
        if let Err(e) = refreshed {
            self.notify_err("Alerts", &e);
        }
        self.emit_alerts();
    }

    /// Views that depend on the filter, plus the summary cards.
    async fn fetch_views(&mut self) {
        let query = self.query();
        let (summary, zones, hourly, health) = tokio::join!(
            self.monitor.summary(Local::now().date_naive()),
            self.monitor.zones_performance(&query),
            self.monitor.hourly_usage(&query),
            self.monitor.device_health(&query),
        );

        match summary {
            Ok(s) => self.send(Action::SummaryUpdated(Arc::new(s))),
            Err(e) => self.notify_err("Summary", &e),
        }
        match zones {
            Ok(z) => self.send(Action::ZonesUpdated(Arc::new(z))),
            Err(e) => self.notify_err("Zones", &e),
        }
        match hourly {
            Ok(h) => self.send(Action::HourlyUpdated(Arc::new(h))),
            Err(e) => self.notify_err("Hourly usage", &e),
        }
        match health {
            Ok(h) => self.send(Action::HealthUpdated(Arc::new(h))),
            Err(e) => self.notify_err("Device health", &e),
        }
        self.fetch_alerts().await;
    }

    async fn restart_live(&mut self) -> watch::Receiver<LiveState> {
        if self.paused {
            self.monitor.start_live_paused(self.query()).await
        } else {
            self.monitor.start_live(self.query()).await
        }
    }

    /// React to a filter transition. Transitions queued behind `state`
    /// collapse into the newest one so a burst costs a single refetch.
    async fn filters_changed(&mut self, mut state: FilterState) -> watch::Receiver<LiveState> {
        while let Ok(newer) = self.filter_changes.try_recv() {
            state = newer;
        }
        debug!(filters = ?state, "filters changed");
        self.emit_filter(&state);
        let rx = self.restart_live().await;
        self.fetch_views().await;
        rx
    }

    // ── Emitters ─────────────────────────────────────────────────

    fn emit_live(&self) {
        let store = self.monitor.store();
        self.send(Action::LiveUpdated(LiveView {
            devices: store.devices_snapshot(),
            tally: store.status_tally(),
            occupancy: store.occupancy(),
            as_of: store.as_of(),
        }));
    }

    fn emit_live_status(&self, rx: &mut watch::Receiver<LiveState>) {
        let state = rx.borrow_and_update();
        self.send(Action::LiveStatusChanged(LiveStatus {
            loading: state.loading,
            error: state.error.clone(),
            paused: self.paused,
            last_updated: state.last_updated,
        }));
    }

    fn emit_alerts(&self) {
        self.send(Action::AlertsUpdated(AlertsView {
            list: Arc::new(self.alerts.list().clone()),
            selection: self.alerts.selection().clone(),
            error: self.alerts.error().map(str::to_owned),
        }));
    }

    // ── Requests ─────────────────────────────────────────────────

    /// Handle one request. Filter mutations only touch the store; the
    /// resulting refetch runs from the change listener.
    async fn handle(&mut self, request: Action) {
        match request {
            Action::Refresh => {
                self.monitor.refresh_live().await;
                self.fetch_views().await;
            }
            Action::ToggleLivePaused => {
                self.paused = !self.paused;
                self.monitor.set_live_enabled(!self.paused).await;
                info!(paused = self.paused, "live polling toggled");
                if let Some(mut rx) = self.monitor.live_state().await {
                    self.emit_live_status(&mut rx);
                }
            }
            Action::CycleFacility => self.cycle_facility().await,
            Action::CycleZone => self.cycle_zone(),
            Action::CycleStatus => self.cycle_status(),
            Action::ClearFilters => self.clear_filters().await,
            Action::ToggleAlert(id) => {
                if let Err(e) = self.alerts.toggle(id) {
                    self.send(Action::Notify(Notification::warning(e.to_string())));
                }
                self.emit_alerts();
            }
            Action::SelectAllAlerts => {
                if self.alerts.select_all() == 0 {
                    self.send(Action::Notify(Notification::info("No unacknowledged alerts")));
                }
                self.emit_alerts();
            }
            Action::ClearAlertSelection => {
                self.alerts.clear_selection();
                self.emit_alerts();
            }
            Action::AcknowledgeAlert(id) => {
                match self.alerts.acknowledge(id).await {
                    Ok(()) => {
                        self.send(Action::Notify(Notification::success(format!("Alert {id} acknowledged"))));
                        self.fetch_summary().await;
                    }
                    Err(e) => self.notify_err("Acknowledge failed", &e),
                }
                self.emit_alerts();
            }
            Action::AcknowledgeSelected => {
                match self.alerts.acknowledge_selected().await {
                    Ok(count) => {
                        self.send(Action::Notify(Notification::success(format!(
                            "Acknowledged {count} alert(s)"
                        ))));
                        self.fetch_summary().await;
                    }
                    Err(e) => self.notify_err("Bulk acknowledge failed", &e),
                }
                self.emit_alerts();
            }
            other => debug!(action = ?other, "not a bridge request"),
        }
    }
}

/// Run the bridge until `cancel` fires or the app drops its request sender.
pub async fn run_data_bridge(
    monitor: Monitor,
    action_tx: mpsc::UnboundedSender<Action>,
    mut requests: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
) {
    let mut bridge = Bridge::new(monitor.clone(), action_tx);
    let mut devices = monitor.store().subscribe_devices().into_stream();

    bridge.load_facilities().await;
    let seed = bridge.filters.current().clone();
    bridge.emit_filter(&seed);
    let mut live_rx = bridge.restart_live().await;
    bridge.fetch_views().await;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(state) = bridge.filter_changes.recv() => {
                live_rx = bridge.filters_changed(state).await;
                bridge.emit_live_status(&mut live_rx);
            }
            request = requests.recv() => {
                let Some(request) = request else { break };
                bridge.handle(request).await;
            }
            Some(_) = devices.next() => bridge.emit_live(),
            Ok(()) = live_rx.changed() => bridge.emit_live_status(&mut live_rx),
        }
    }

    monitor.stop_live().await;
    monitor.shutdown();
    debug!("data bridge shut down");
}
