// Analytics endpoints backing the chart panels.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DeviceHealthReport, HourlyUsage, OccupancyTrend};
use crate::query::ListQuery;

impl ApiClient {
    /// Per-hour occupancy over the last day.
    ///
    /// `GET /analytics/hourly-usage/`
    pub async fn hourly_usage(&self, query: &ListQuery) -> Result<HourlyUsage, Error> {
        let url = self.url_with_query("analytics/hourly-usage/", query)?;
        self.get(url).await
    }

    /// Per-day occupancy; pass `days` in the query to widen the window.
    ///
    /// `GET /analytics/occupancy-trend/?days=N`
    pub async fn occupancy_trend(&self, query: &ListQuery) -> Result<OccupancyTrend, Error> {
        let url = self.url_with_query("analytics/occupancy-trend/", query)?;
        self.get(url).await
    }

    /// Device health categories and per-device scores.
    ///
    /// `GET /analytics/device-health/`
    pub async fn device_health(&self, query: &ListQuery) -> Result<DeviceHealthReport, Error> {
        let url = self.url_with_query("analytics/device-health/", query)?;
        self.get(url).await
    }
}
