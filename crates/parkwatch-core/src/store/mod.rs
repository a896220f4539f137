// ── Central live-device store ──
//
// One authoritative copy of the live device list. The poller commits each
// response here as a full replace; every view (header counts, device
// table, export) reads from the same snapshot so they never disagree.

mod collection;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parkwatch_api::models::{LiveDevice, LiveStatusResponse};
use tokio::sync::watch;
use tracing::debug;

use crate::health::{OccupancyCounts, StatusTally, occupancy_counts};
use crate::stream::{DeviceFeed, DeviceSnapshot};
use collection::EntityCollection;

pub struct LiveStore {
    devices: EntityCollection<LiveDevice>,
    /// Server timestamp of the last applied snapshot.
    as_of: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStore {
    pub fn new() -> Self {
        let (as_of, _) = watch::channel(None);
        Self {
            devices: EntityCollection::new(),
            as_of,
        }
    }

    /// Replace the device set with `snapshot`, keyed by device code.
    pub fn apply_live_snapshot(&self, snapshot: &LiveStatusResponse) {
        self.devices.replace_all(
            snapshot
                .devices
                .iter()
                .map(|d| (d.code.clone(), d.clone())),
        );
        self.as_of.send_replace(snapshot.timestamp.or_else(|| Some(Utc::now())));
        debug!(
            devices = snapshot.devices.len(),
            version = self.devices.version(),
            "live snapshot applied"
        );
    }

    pub fn devices_snapshot(&self) -> DeviceSnapshot {
        self.devices.snapshot()
    }

    pub fn subscribe_devices(&self) -> DeviceFeed {
        DeviceFeed::new(self.devices.subscribe())
    }

    pub fn device(&self, code: &str) -> Option<Arc<LiveDevice>> {
        self.devices.get(code)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        *self.as_of.borrow()
    }

    pub fn status_tally(&self) -> StatusTally {
        let snap = self.devices.snapshot();
        StatusTally::from_devices(snap.iter().map(AsRef::as_ref))
    }

    pub fn occupancy(&self) -> OccupancyCounts {
        let snap = self.devices.snapshot();
        occupancy_counts(snap.iter().map(AsRef::as_ref))
    }

    pub fn clear(&self) {
        self.devices.clear();
        self.as_of.send_replace(None);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parkwatch_api::models::{DeviceStatus, FacilityRef, ParkingSnapshot, ZoneRef};

    use super::*;

    fn device(code: &str, status: DeviceStatus, occupied: bool) -> LiveDevice {
        LiveDevice {
            id: 1,
            code: code.into(),
            zone: ZoneRef {
                id: 1,
                name: "Level A".into(),
            },
            facility: FacilityRef {
                id: 1,
                name: "Downtown".into(),
            },
            status,
            health_score: 100,
            last_seen: None,
            time_since_seen: None,
            telemetry: None,
            parking: Some(ParkingSnapshot {
                is_occupied: occupied,
                timestamp: None,
            }),
            alerts: Vec::new(),
            alerts_count: 0,
        }
    }

    fn response(devices: Vec<LiveDevice>) -> LiveStatusResponse {
        LiveStatusResponse {
            timestamp: None,
            total_devices: devices.len() as u64,
            devices,
        }
    }

    #[test]
    fn each_snapshot_is_a_full_replace() {
        let store = LiveStore::new();
        store.apply_live_snapshot(&response(vec![
            device("PK-001", DeviceStatus::Ok, true),
            device("PK-002", DeviceStatus::Critical, false),
        ]));
        store.apply_live_snapshot(&response(vec![device("PK-002", DeviceStatus::Ok, true)]));

        assert_eq!(store.device_count(), 1);
        assert!(store.device("PK-001").is_none());
        assert_eq!(store.device("PK-002").unwrap().status, DeviceStatus::Ok);
        assert!(store.as_of().is_some());
    }

    #[test]
    fn derived_counts_read_the_same_snapshot() {
        let store = LiveStore::new();
        store.apply_live_snapshot(&response(vec![
            device("PK-001", DeviceStatus::Ok, true),
            device("PK-002", DeviceStatus::Warning, false),
            device("PK-003", DeviceStatus::Ok, true),
        ]));

        let tally = store.status_tally();
        assert_eq!((tally.ok, tally.warning, tally.critical), (2, 1, 0));
        let occupancy = store.occupancy();
        assert_eq!((occupancy.occupied, occupancy.vacant), (2, 1));
        assert_eq!(tally.total(), store.devices_snapshot().len());
    }

    #[tokio::test]
    async fn subscribers_see_new_snapshots() {
        let store = LiveStore::new();
        let mut stream = store.subscribe_devices();
        assert!(stream.current().is_empty());

        store.apply_live_snapshot(&response(vec![device("PK-001", DeviceStatus::Ok, true)]));

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
    }

    #[tokio::test]
    async fn device_stream_yields_only_later_snapshots() {
        use futures::StreamExt;

        let store = LiveStore::new();
        store.apply_live_snapshot(&response(vec![device("PK-001", DeviceStatus::Ok, true)]));
        let mut devices = store.subscribe_devices().into_stream();

        store.apply_live_snapshot(&response(vec![
            device("PK-003", DeviceStatus::Ok, false),
            device("PK-002", DeviceStatus::Warning, true),
        ]));

        let snap = devices.next().await.unwrap();
        let codes: Vec<&str> = snap.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["PK-002", "PK-003"]);
    }
}
