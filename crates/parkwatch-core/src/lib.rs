//! Polling, filtering, alert handling and export for parking monitoring
//! front-ends (CLI / TUI).
//!
//! - **[`Monitor`]**: facade owning the [`ApiClient`](parkwatch_api::ApiClient),
//!   the [`LiveStore`] and the live-status [`Poller`].
//!   [`Monitor::oneshot()`] runs a single CLI request cycle.
//!
//! - **[`Poller<T>`]**: fixed-cadence fetch loop with manual refresh,
//!   pause/resume and sequence-numbered commits, so an old response can never
//!   overwrite a newer one.
//!
//! - **[`FilterStore`]**: the current filter selection, with change
//!   notification and the facility→zone clearing rule.
//!
//! - **[`FacilityLookup`]** and **[`AlertBoard`]**: stateful helpers over the
//!   [`FacilitySource`] / [`AlertSource`] traits, so they can be driven by
//!   fakes in tests.
//!
//! - **[`export`]**: flattening records into rows and writing CSV, Excel and
//!   PDF files.

pub mod alerts;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod health;
pub mod lookup;
pub mod monitor;
pub mod poller;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use alerts::{AlertBoard, AlertSelection, AlertSource, SelectionError};
pub use config::MonitorConfig;
pub use error::CoreError;
pub use filter::{FilterKey, FilterState, FilterStore};
pub use health::{HealthTier, OccupancyCounts, StatusTally};
pub use lookup::{FacilityLookup, FacilitySource};
pub use monitor::{LiveState, Monitor};
pub use poller::{PollState, Poller, PollerConfig};
pub use store::LiveStore;
pub use stream::{DeviceFeed, DeviceSnapshot};

// API types consumers need alongside core.
pub use parkwatch_api::models;
pub use parkwatch_api::{ApiClient, ListQuery};
