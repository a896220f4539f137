// ── Monitor facade ──
//
// Single entry point for the CLI and TUI: owns the HTTP client, the live
// store and the live-status poller. Reads that are not polled go straight
// to the API through the delegating methods below.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use parkwatch_api::models::{
    Alert, AlertId, AlertListResponse, BulkAcknowledgeResponse, DashboardSummary,
    DeviceHealthReport, DeviceHeartbeat, Facility, FacilityId, HourlyUsage, LiveStatusResponse,
    OccupancyTrend, Zone, ZonePerformance,
};
use parkwatch_api::{ApiClient, ListQuery, TransportConfig};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{DEFAULT_POLL_INTERVAL, MonitorConfig};
use crate::error::CoreError;
use crate::poller::{PollState, Poller, PollerConfig};
use crate::store::LiveStore;

pub type LiveState = PollState<LiveStatusResponse>;

/// Cheaply cloneable handle; all clones share one client, store and poller.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    client: ApiClient,
    store: Arc<LiveStore>,
    cancel: CancellationToken,
    live: Mutex<Option<LiveHandle>>,
}

struct LiveHandle {
    poller: Poller<LiveStatusResponse>,
    bridge: JoinHandle<()>,
}

impl Monitor {
    /// Build the HTTP client. Does not contact the backend.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = ApiClient::new(&config.api_url, &transport).map_err(|e| {
            CoreError::ConnectionFailed {
                url: config.api_url.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                client,
                store: Arc::new(LiveStore::new()),
                cancel: CancellationToken::new(),
                live: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn store(&self) -> &Arc<LiveStore> {
        &self.inner.store
    }

    // ── Live polling ─────────────────────────────────────────────

    /// Start polling live status with `query`, replacing any running poller.
    ///
    /// Every committed response is applied to the [`LiveStore`]. A zero poll
    /// interval fetches once and then waits for manual refreshes.
    pub async fn start_live(&self, query: ListQuery) -> watch::Receiver<LiveState> {
        self.launch_live(query, true).await
    }

    /// Like [`start_live`](Self::start_live) with the cadence paused from
    /// the first instant: one fetch for `query`, then manual refreshes only.
    pub async fn start_live_paused(&self, query: ListQuery) -> watch::Receiver<LiveState> {
        self.launch_live(query, false).await
    }

    async fn launch_live(&self, query: ListQuery, cadence: bool) -> watch::Receiver<LiveState> {
        let mut live = self.inner.live.lock().await;
        if let Some(old) = live.take() {
            old.stop();
        }

        let interval = self.inner.config.poll_interval;
        let config = PollerConfig {
            interval: if interval.is_zero() {
                DEFAULT_POLL_INTERVAL
            } else {
                interval
            },
            enabled: cadence && !interval.is_zero(),
        };

        let client = self.inner.client.clone();
        let poller = Poller::spawn(
            move || {
                let client = client.clone();
                let query = query.clone();
                async move { Ok(client.live_status(&query).await?) }
            },
            config,
            &self.inner.cancel,
        );
        if !config.enabled {
            poller.refresh();
        }

        let rx = poller.subscribe();
        let bridge = tokio::spawn(store_bridge(
            poller.subscribe(),
            Arc::clone(&self.inner.store),
            self.inner.cancel.child_token(),
        ));
        info!(
            interval_secs = interval.as_secs(),
            paused = !config.enabled,
            "live polling started"
        );

        *live = Some(LiveHandle { poller, bridge });
        rx
    }

    /// Stop live polling. Results still in flight are discarded.
    pub async fn stop_live(&self) {
        if let Some(live) = self.inner.live.lock().await.take() {
            live.stop();
            info!("live polling stopped");
        }
    }

    /// Fetch live status now, outside the cadence. No-op when not polling.
    pub async fn refresh_live(&self) {
        if let Some(live) = self.inner.live.lock().await.as_ref() {
            live.poller.refresh();
        }
    }

    /// Pause or resume the live cadence.
    pub async fn set_live_enabled(&self, enabled: bool) {
        if let Some(live) = self.inner.live.lock().await.as_ref() {
            live.poller.set_enabled(enabled);
        }
    }

    pub async fn live_enabled(&self) -> bool {
        self.inner
            .live
            .lock()
            .await
            .as_ref()
            .is_some_and(|l| l.poller.is_enabled())
    }

    /// Subscribe to the running live poller, if any.
    pub async fn live_state(&self) -> Option<watch::Receiver<LiveState>> {
        self.inner.live.lock().await.as_ref().map(|l| l.poller.subscribe())
    }

    /// Cancel every background task owned by this monitor.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Run `f` against a fresh monitor, then shut it down.
    pub async fn oneshot<F, Fut, T>(config: MonitorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Monitor) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let monitor = Monitor::new(config)?;
        let result = f(monitor.clone()).await;
        monitor.stop_live().await;
        monitor.shutdown();
        result
    }

    // ── One-off reads and writes ─────────────────────────────────

    pub async fn summary(&self, date: NaiveDate) -> Result<DashboardSummary, CoreError> {
        Ok(self.inner.client.dashboard_summary(date).await?)
    }

    pub async fn zones_performance(&self, query: &ListQuery) -> Result<Vec<ZonePerformance>, CoreError> {
        Ok(self.inner.client.zones_performance(query).await?)
    }

    pub async fn devices_heartbeat(&self, query: &ListQuery) -> Result<Vec<DeviceHeartbeat>, CoreError> {
        Ok(self.inner.client.devices_heartbeat(query).await?)
    }

    /// One live-status fetch that also updates the store.
    pub async fn live_once(&self, query: &ListQuery) -> Result<LiveStatusResponse, CoreError> {
        let response = self.inner.client.live_status(query).await?;
        self.inner.store.apply_live_snapshot(&response);
        Ok(response)
    }

    pub async fn facilities(&self) -> Result<Vec<Facility>, CoreError> {
        Ok(self.inner.client.facilities().await?)
    }

    pub async fn facility_zones(&self, facility_id: FacilityId) -> Result<Vec<Zone>, CoreError> {
        Ok(self.inner.client.facility_zones(facility_id).await?)
    }

    pub async fn alerts(&self, query: &ListQuery) -> Result<AlertListResponse, CoreError> {
        Ok(self.inner.client.alerts(query).await?)
    }

    pub async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, CoreError> {
        Ok(self.inner.client.acknowledge_alert(id).await?)
    }

    /// Acknowledge several alerts in one request. An empty list is rejected
    /// without contacting the backend.
    pub async fn bulk_acknowledge(&self, ids: &[AlertId]) -> Result<BulkAcknowledgeResponse, CoreError> {
        if ids.is_empty() {
            return Err(CoreError::Validation {
                message: "No alerts selected".into(),
            });
        }
        Ok(self.inner.client.bulk_acknowledge(ids).await?)
    }

    pub async fn hourly_usage(&self, query: &ListQuery) -> Result<HourlyUsage, CoreError> {
        Ok(self.inner.client.hourly_usage(query).await?)
    }

    pub async fn occupancy_trend(&self, query: &ListQuery) -> Result<OccupancyTrend, CoreError> {
        Ok(self.inner.client.occupancy_trend(query).await?)
    }

    pub async fn device_health(&self, query: &ListQuery) -> Result<DeviceHealthReport, CoreError> {
        Ok(self.inner.client.device_health(query).await?)
    }
}

impl LiveHandle {
    fn stop(self) {
        self.poller.shutdown();
        self.bridge.abort();
    }
}

/// Copy each newly committed payload into the store.
async fn store_bridge(
    mut rx: watch::Receiver<LiveState>,
    store: Arc<LiveStore>,
    cancel: CancellationToken,
) {
    let mut applied: Option<Arc<LiveStatusResponse>> = None;
    loop {
        let data = rx.borrow_and_update().data.clone();
        if let Some(data) = data {
            let is_new = applied.as_ref().is_none_or(|prev| !Arc::ptr_eq(prev, &data));
            if is_new {
                store.apply_live_snapshot(&data);
                applied = Some(data);
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            res = rx.changed() => {
                if res.is_err() {
                    break;
                }
            }
        }
    }
    debug!("live store bridge stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn live_body(codes: &[&str]) -> serde_json::Value {
        let devices: Vec<serde_json::Value> = codes
            .iter()
            .enumerate()
            .map(|(i, code)| {
                json!({
                    "id": i + 1,
                    "code": code,
                    "zone": {"id": 1, "name": "Level A"},
                    "facility": {"id": 1, "name": "Downtown"},
                    "status": "OK",
                    "health_score": 100,
                    "last_seen": "2024-05-01T10:00:00Z",
                    "time_since_seen": 5,
                    "telemetry": null,
                    "parking": {"is_occupied": true, "timestamp": "2024-05-01T10:00:00Z"},
                    "alerts": [],
                    "alerts_count": 0
                })
            })
            .collect();
        json!({
            "timestamp": "2024-05-01T10:00:05Z",
            "devices": devices,
            "total_devices": codes.len()
        })
    }

    fn config(server: &MockServer, poll_interval: Duration) -> MonitorConfig {
        MonitorConfig {
            api_url: format!("{}/api", server.uri()),
            poll_interval,
            ..MonitorConfig::default()
        }
    }

    #[tokio::test]
    async fn live_polling_fills_the_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/devices/live-status/"))
            .and(query_param("facility", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body(&["PK-002", "PK-001"])))
            .mount(&server)
            .await;

        let monitor = Monitor::new(config(&server, Duration::from_secs(60))).unwrap();
        let mut devices = monitor.store().subscribe_devices();
        let mut state = monitor.start_live(ListQuery::new().facility(1)).await;

        let snap = tokio::time::timeout(Duration::from_secs(5), devices.changed())
            .await
            .unwrap()
            .unwrap();
        let codes: Vec<&str> = snap.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["PK-001", "PK-002"]);

        state.changed().await.unwrap();
        let current = state.borrow().clone();
        assert!(!current.loading);
        assert!(current.error.is_none());
        assert_eq!(current.data.unwrap().total_devices, 2);

        monitor.shutdown();
    }

    #[tokio::test]
    async fn zero_interval_fetches_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/devices/live-status/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body(&["PK-001"])))
            .expect(1)
            .mount(&server)
            .await;

        let monitor = Monitor::new(config(&server, Duration::ZERO)).unwrap();
        let mut devices = monitor.store().subscribe_devices();
        monitor.start_live(ListQuery::new()).await;

        tokio::time::timeout(Duration::from_secs(5), devices.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(!monitor.live_enabled().await);
        monitor.stop_live().await;
        assert!(monitor.live_state().await.is_none());
    }

    #[tokio::test]
    async fn paused_start_fetches_once_and_never_ticks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/devices/live-status/"))
            .and(query_param("zone", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body(&["PK-001"])))
            .expect(1)
            .mount(&server)
            .await;

        let monitor = Monitor::new(config(&server, Duration::from_millis(20))).unwrap();
        let mut devices = monitor.store().subscribe_devices();
        monitor.start_live_paused(ListQuery::new().zone(4)).await;
        assert!(!monitor.live_enabled().await);

        tokio::time::timeout(Duration::from_secs(5), devices.changed())
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        monitor.stop_live().await;
    }

    #[tokio::test]
    async fn empty_bulk_acknowledge_sends_nothing() {
        let server = MockServer::start().await;
        let monitor = Monitor::new(config(&server, Duration::ZERO)).unwrap();

        let err = monitor.bulk_acknowledge(&[]).await.unwrap_err();

        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_message_names_the_configured_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/facilities/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let monitor = Monitor::new(MonitorConfig {
            timeout: Duration::from_secs(1),
            ..config(&server, Duration::ZERO)
        })
        .unwrap();

        let err = monitor.facilities().await.unwrap_err();
        assert_eq!(err.display_message(), "Monitoring API timed out after 1s");
    }

    #[tokio::test]
    async fn oneshot_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/facilities/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let err = Monitor::oneshot(config(&server, Duration::ZERO), |m| async move {
            m.facilities().await
        })
        .await
        .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.display_message(), "boom");
    }
}
