use crate::client::ApiClient;
use crate::error::Error;
use crate::models::LiveStatusResponse;
use crate::query::ListQuery;

impl ApiClient {
    /// Telemetry and parking snapshot for every active device.
    ///
    /// `GET /devices/live-status/`, optionally scoped by facility/zone.
    pub async fn live_status(&self, query: &ListQuery) -> Result<LiveStatusResponse, Error> {
        let url = self.url_with_query("devices/live-status/", query)?;
        self.get(url).await
    }
}
