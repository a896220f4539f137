// ── Runtime monitor configuration ──
//
// Describes *where* the monitoring API lives and how often to poll it.
// Never touches disk: the CLI/TUI builds a `MonitorConfig` from a config
// profile and hands it in.

use std::time::Duration;

use parkwatch_api::ListQuery;
use parkwatch_api::models::{FacilityId, ZoneId};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// API root, e.g. `http://localhost:8000/api`.
    pub api_url: String,
    pub timeout: Duration,
    /// Live-status cadence. Zero disables background polling.
    pub poll_interval: Duration,
    /// Facility scope applied to live polling when no explicit filter is given.
    pub facility: Option<FacilityId>,
    pub zone: Option<ZoneId>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            facility: None,
            zone: None,
        }
    }
}

impl MonitorConfig {
    /// Query scoped to the configured facility/zone.
    pub fn default_query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(facility) = self.facility {
            query = query.facility(facility);
        }
        if let Some(zone) = self.zone {
            query = query.zone(zone);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_is_unscoped() {
        assert!(MonitorConfig::default().default_query().is_empty());
    }

    #[test]
    fn default_query_carries_scope() {
        let config = MonitorConfig {
            facility: Some(2),
            zone: Some(14),
            ..MonitorConfig::default()
        };
        let query = config.default_query();
        assert_eq!(query.get("facility"), Some("2"));
        assert_eq!(query.get("zone"), Some("14"));
    }
}
