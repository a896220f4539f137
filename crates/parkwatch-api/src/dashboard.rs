// Dashboard endpoints
//
// Summary cards, zone performance, and the heartbeat device list.

use chrono::NaiveDate;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DashboardSummary, DeviceHeartbeat, ZonePerformance};
use crate::query::ListQuery;

impl ApiClient {
    /// Aggregate counters for one day.
    ///
    /// `GET /dashboard/summary/?date=YYYY-MM-DD`
    pub async fn dashboard_summary(&self, date: NaiveDate) -> Result<DashboardSummary, Error> {
        let url = self.url_with_query("dashboard/summary/", &ListQuery::new().date(date))?;
        debug!(%date, "fetching dashboard summary");
        self.get(url).await
    }

    /// Zone metrics, filterable by facility/zone/search/sort.
    ///
    /// `GET /dashboard/zones-performances/`
    pub async fn zones_performance(&self, query: &ListQuery) -> Result<Vec<ZonePerformance>, Error> {
        let url = self.url_with_query("dashboard/zones-performances/", query)?;
        self.get(url).await
    }

    /// Device heartbeat list, filterable by facility/zone/status/search/sort.
    ///
    /// `GET /dashboard/devices-hearbeat/` (the backend's spelling).
    pub async fn devices_heartbeat(&self, query: &ListQuery) -> Result<Vec<DeviceHeartbeat>, Error> {
        let url = self.url_with_query("dashboard/devices-hearbeat/", query)?;
        self.get(url).await
    }
}
