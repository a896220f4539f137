// ── Alert selection & acknowledgement ──
//
// Holds the loaded alert list, the active filter query and the set of
// selected alert ids. Only unacknowledged alerts can be selected.
// Acknowledging (one or many) is always followed by a full re-fetch of the
// list; the board never patches alerts locally.

use std::collections::BTreeSet;
use std::future::Future;

use parkwatch_api::models::{Alert, AlertId, AlertListResponse, BulkAcknowledgeResponse};
use parkwatch_api::{ApiClient, ListQuery};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Where alerts come from and where acknowledgements go.
pub trait AlertSource: Send + Sync {
    fn alerts(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<AlertListResponse, CoreError>> + Send;

    fn acknowledge_alert(&self, id: AlertId) -> impl Future<Output = Result<Alert, CoreError>> + Send;

    fn bulk_acknowledge(
        &self,
        ids: &[AlertId],
    ) -> impl Future<Output = Result<BulkAcknowledgeResponse, CoreError>> + Send;
}

impl AlertSource for ApiClient {
    async fn alerts(&self, query: &ListQuery) -> Result<AlertListResponse, CoreError> {
        Ok(ApiClient::alerts(self, query).await?)
    }

    async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, CoreError> {
        Ok(ApiClient::acknowledge_alert(self, id).await?)
    }

    async fn bulk_acknowledge(&self, ids: &[AlertId]) -> Result<BulkAcknowledgeResponse, CoreError> {
        Ok(ApiClient::bulk_acknowledge(self, ids).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Alert {0} is already acknowledged")]
    AlreadyAcknowledged(AlertId),
    #[error("Alert {0} is not in the current list")]
    UnknownAlert(AlertId),
}

/// Ids picked for bulk acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSelection(BTreeSet<AlertId>);

impl AlertSelection {
    pub fn contains(&self, id: AlertId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<AlertId> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<AlertId> for AlertSelection {
    fn from_iter<I: IntoIterator<Item = AlertId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug)]
pub struct AlertBoard<S> {
    source: S,
    query: ListQuery,
    list: AlertListResponse,
    selection: AlertSelection,
    error: Option<String>,
}

impl<S: AlertSource> AlertBoard<S> {
    pub fn new(source: S, query: ListQuery) -> Self {
        Self {
            source,
            query,
            list: AlertListResponse::default(),
            selection: AlertSelection::default(),
            error: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn list(&self) -> &AlertListResponse {
        &self.list
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.list.alerts
    }

    pub fn selection(&self) -> &AlertSelection {
        &self.selection
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the filter query. Takes effect on the next refresh.
    pub fn set_query(&mut self, query: ListQuery) {
        self.query = query;
    }

    /// Whether a row should offer a selection checkbox.
    pub fn is_selectable(&self, id: AlertId) -> bool {
        self.find(id).is_some_and(|a| !a.acknowledged)
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Re-fetch the list with the current query, then prune the selection
    /// to ids that are still present and unacknowledged.
    pub async fn refresh(&mut self) -> Result<&AlertListResponse, CoreError> {
        match self.source.alerts(&self.query).await {
            Ok(list) => {
                self.list = list;
                self.error = None;
                let list = &self.list;
                self.selection
                    .0
                    .retain(|id| list.alerts.iter().any(|a| a.id == *id && !a.acknowledged));
                Ok(&self.list)
            }
            Err(e) => {
                warn!(error = %e, "alert list fetch failed");
                self.error = Some(e.display_message());
                Err(e)
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────

    pub fn select(&mut self, id: AlertId) -> Result<(), SelectionError> {
        self.check_selectable(id)?;
        self.selection.0.insert(id);
        Ok(())
    }

    pub fn deselect(&mut self, id: AlertId) {
        self.selection.0.remove(&id);
    }

    /// Flip one alert's selection. Returns whether it is now selected.
    pub fn toggle(&mut self, id: AlertId) -> Result<bool, SelectionError> {
        if self.selection.0.remove(&id) {
            return Ok(false);
        }
        self.select(id)?;
        Ok(true)
    }

    /// Select every unacknowledged alert in the loaded list. Returns the
    /// number selected.
    pub fn select_all(&mut self) -> usize {
        self.selection.0 = self
            .list
            .alerts
            .iter()
            .filter(|a| !a.acknowledged)
            .map(|a| a.id)
            .collect();
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.0.clear();
    }

    // ── Acknowledgement ──────────────────────────────────────────

    /// Acknowledge one alert, then re-fetch the whole list.
    pub async fn acknowledge(&mut self, id: AlertId) -> Result<(), CoreError> {
        if let Err(e) = self.source.acknowledge_alert(id).await {
            warn!(id, error = %e, "acknowledge failed");
            self.error = Some(e.display_message());
            return Err(e);
        }
        info!(id, "alert acknowledged");
        self.selection.0.remove(&id);
        self.refresh().await?;
        Ok(())
    }

    /// Acknowledge every selected alert in one request, then re-fetch.
    /// Returns the backend's acknowledged count.
    pub async fn acknowledge_selected(&mut self) -> Result<u64, CoreError> {
        if self.selection.is_empty() {
            return Err(CoreError::Validation {
                message: "No alerts selected".into(),
            });
        }

        let ids = self.selection.ids();
        debug!(count = ids.len(), "acknowledging selection");
        let resp = match self.source.bulk_acknowledge(&ids).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "bulk acknowledge failed");
                self.error = Some(e.display_message());
                return Err(e);
            }
        };
        info!(count = resp.acknowledged_count, "alerts acknowledged");
        self.selection.0.clear();
        self.refresh().await?;
        Ok(resp.acknowledged_count)
    }

    fn find(&self, id: AlertId) -> Option<&Alert> {
        self.list.alerts.iter().find(|a| a.id == id)
    }

    fn check_selectable(&self, id: AlertId) -> Result<(), SelectionError> {
        match self.find(id) {
            None => Err(SelectionError::UnknownAlert(id)),
            Some(a) if a.acknowledged => Err(SelectionError::AlreadyAcknowledged(id)),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use parkwatch_api::models::AlertSeverity;
    use pretty_assertions::assert_eq;

    use super::*;

    fn alert(id: AlertId, acknowledged: bool) -> Alert {
        Alert {
            id,
            device_code: format!("PK-{id:03}"),
            facility_name: "Downtown".into(),
            zone_name: "Level A".into(),
            message: "Device offline".into(),
            severity: AlertSeverity::Critical,
            acknowledged,
            is_active: true,
            created_at: None,
        }
    }

    /// In-memory backend that records every call.
    struct FakeAlerts {
        alerts: Mutex<Vec<Alert>>,
        calls: Mutex<Vec<String>>,
        fail_acks: bool,
    }

    impl FakeAlerts {
        fn new(alerts: Vec<Alert>) -> Self {
            Self {
                alerts: Mutex::new(alerts),
                calls: Mutex::new(Vec::new()),
                fail_acks: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn ack_error() -> CoreError {
            CoreError::Api {
                message: "Alert not found".into(),
                status: Some(404),
            }
        }
    }

    impl AlertSource for FakeAlerts {
        async fn alerts(&self, _query: &ListQuery) -> Result<AlertListResponse, CoreError> {
            self.calls.lock().unwrap().push("list".into());
            let alerts = self.alerts.lock().unwrap().clone();
            let acknowledged = alerts.iter().filter(|a| a.acknowledged).count() as u64;
            Ok(AlertListResponse {
                total: alerts.len() as u64,
                acknowledged,
                unacknowledged: alerts.len() as u64 - acknowledged,
                alerts,
                ..AlertListResponse::default()
            })
        }

        async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, CoreError> {
            self.calls.lock().unwrap().push(format!("ack {id}"));
            if self.fail_acks {
                return Err(Self::ack_error());
            }
            let mut alerts = self.alerts.lock().unwrap();
            let alert = alerts.iter_mut().find(|a| a.id == id).ok_or_else(Self::ack_error)?;
            alert.acknowledged = true;
            Ok(alert.clone())
        }

        async fn bulk_acknowledge(
            &self,
            ids: &[AlertId],
        ) -> Result<BulkAcknowledgeResponse, CoreError> {
            self.calls.lock().unwrap().push(format!("bulk {ids:?}"));
            if self.fail_acks {
                return Err(Self::ack_error());
            }
            let mut count = 0;
            for alert in self.alerts.lock().unwrap().iter_mut() {
                if ids.contains(&alert.id) {
                    alert.acknowledged = true;
                    count += 1;
                }
            }
            Ok(BulkAcknowledgeResponse {
                status: "success".into(),
                acknowledged_count: count,
            })
        }
    }

    async fn loaded_board(fake: FakeAlerts) -> AlertBoard<FakeAlerts> {
        let mut board = AlertBoard::new(fake, ListQuery::new());
        board.refresh().await.unwrap();
        board
    }

    fn sample() -> Vec<Alert> {
        vec![alert(3, false), alert(5, true), alert(7, false)]
    }

    #[tokio::test]
    async fn acknowledged_alerts_cannot_be_selected() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;

        assert_eq!(board.select(5), Err(SelectionError::AlreadyAcknowledged(5)));
        assert_eq!(board.select(42), Err(SelectionError::UnknownAlert(42)));
        assert!(!board.is_selectable(5));
        assert!(board.selection().is_empty());
    }

    #[tokio::test]
    async fn toggle_flips_selection() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        assert_eq!(board.toggle(3), Ok(true));
        assert_eq!(board.toggle(3), Ok(false));
        assert!(board.selection().is_empty());
    }

    #[tokio::test]
    async fn select_all_takes_only_unacknowledged_loaded_alerts() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        assert_eq!(board.select_all(), 2);
        assert_eq!(board.selection().ids(), vec![3, 7]);
    }

    #[tokio::test]
    async fn bulk_acknowledge_clears_selection_and_refetches_once() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        board.select(3).unwrap();
        board.select(7).unwrap();

        let count = board.acknowledge_selected().await.unwrap();

        assert_eq!(count, 2);
        assert!(board.selection().is_empty());
        assert_eq!(
            board.source.calls(),
            vec!["list", "bulk [3, 7]", "list"]
        );
        assert!(board.alerts().iter().all(|a| a.acknowledged));
    }

    #[tokio::test]
    async fn single_acknowledge_refetches_and_drops_id() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        board.select(3).unwrap();
        board.select(7).unwrap();

        board.acknowledge(3).await.unwrap();

        assert_eq!(board.selection().ids(), vec![7]);
        assert_eq!(board.source.calls(), vec!["list", "ack 3", "list"]);
        assert_eq!(board.list().acknowledged, 2);
    }

    #[tokio::test]
    async fn failed_bulk_acknowledge_keeps_selection() {
        let mut fake = FakeAlerts::new(sample());
        fake.fail_acks = true;
        let mut board = loaded_board(fake).await;
        board.select_all();

        let err = board.acknowledge_selected().await.unwrap_err();

        assert_eq!(err.display_message(), "Alert not found");
        assert_eq!(board.error(), Some("Alert not found"));
        assert_eq!(board.selection().ids(), vec![3, 7]);
        assert_eq!(board.source.calls(), vec!["list", "bulk [3, 7]"]);
    }

    #[tokio::test]
    async fn empty_selection_sends_nothing() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        assert!(matches!(
            board.acknowledge_selected().await,
            Err(CoreError::Validation { .. })
        ));
        assert_eq!(board.source.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn refresh_prunes_vanished_ids() {
        let mut board = loaded_board(FakeAlerts::new(sample())).await;
        board.select_all();
        board.source.alerts.lock().unwrap().retain(|a| a.id != 7);

        board.refresh().await.unwrap();

        assert_eq!(board.selection().ids(), vec![3]);
    }
}
