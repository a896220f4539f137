// ── Live device feed ──
//
// Change subscription over the store's device snapshot. Consumers that only
// need "redraw when the device set changes" take it as a `Stream`.

use std::sync::Arc;

use parkwatch_api::models::LiveDevice;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// One full device snapshot, ordered by device code.
pub type DeviceSnapshot = Arc<Vec<Arc<LiveDevice>>>;

/// Subscription to [`LiveStore`](crate::LiveStore) device snapshots.
pub struct DeviceFeed {
    receiver: watch::Receiver<DeviceSnapshot>,
}

impl DeviceFeed {
    pub(crate) fn new(receiver: watch::Receiver<DeviceSnapshot>) -> Self {
        Self { receiver }
    }

    pub fn current(&self) -> DeviceSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next applied snapshot. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<DeviceSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Snapshots applied from now on. The one current at conversion time is
    /// not replayed.
    pub fn into_stream(self) -> WatchStream<DeviceSnapshot> {
        WatchStream::from_changes(self.receiver)
    }
}
