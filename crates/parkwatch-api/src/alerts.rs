// Alert endpoints
//
// Listing with summary stats, plus the two acknowledge mutations. There is
// no un-acknowledge call; acknowledgement is terminal on the backend.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Alert, AlertId, AlertListResponse, BulkAcknowledgeResponse};
use crate::query::ListQuery;

impl ApiClient {
    /// Filtered alert list with total/acknowledged/severity counts.
    ///
    /// `GET /alerts/`
    pub async fn alerts(&self, query: &ListQuery) -> Result<AlertListResponse, Error> {
        let url = self.url_with_query("alerts/", query)?;
        self.get(url).await
    }

    /// Acknowledge a single alert, returning its updated record.
    ///
    /// `PATCH /alerts/{id}/acknowledge/`
    pub async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, Error> {
        let url = self.url(&format!("alerts/{id}/acknowledge/"))?;
        debug!(id, "acknowledging alert");
        self.patch(url).await
    }

    /// Acknowledge many alerts in one request.
    ///
    /// `POST /alerts/bulk-acknowledge/` with `{"alert_ids": [...]}`
    pub async fn bulk_acknowledge(&self, ids: &[AlertId]) -> Result<BulkAcknowledgeResponse, Error> {
        let url = self.url("alerts/bulk-acknowledge/")?;
        debug!(count = ids.len(), "bulk acknowledging alerts");
        self.post(url, &json!({ "alert_ids": ids })).await
    }
}
