// ── Facility / zone lookup ──
//
// Supplies the two filter dropdown domains. The facility list is fetched
// once; the zone list follows the selected facility, taken from the nested
// zones when the backend embeds them and fetched separately otherwise.

use std::future::Future;

use parkwatch_api::ApiClient;
use parkwatch_api::models::{Facility, FacilityId, Zone, ZoneId};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Where facilities and their zones come from.
pub trait FacilitySource: Send + Sync {
    fn facilities(&self) -> impl Future<Output = Result<Vec<Facility>, CoreError>> + Send;

    fn facility_zones(
        &self,
        facility_id: FacilityId,
    ) -> impl Future<Output = Result<Vec<Zone>, CoreError>> + Send;
}

impl FacilitySource for ApiClient {
    async fn facilities(&self) -> Result<Vec<Facility>, CoreError> {
        Ok(ApiClient::facilities(self).await?)
    }

    async fn facility_zones(&self, facility_id: FacilityId) -> Result<Vec<Zone>, CoreError> {
        Ok(ApiClient::facility_zones(self, facility_id).await?)
    }
}

#[derive(Debug)]
pub struct FacilityLookup<S> {
    source: S,
    facilities: Vec<Facility>,
    zones: Vec<Zone>,
    selected: Option<FacilityId>,
    attempted: bool,
    facilities_error: Option<String>,
    zones_error: Option<String>,
}

impl<S: FacilitySource> FacilityLookup<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            facilities: Vec::new(),
            zones: Vec::new(),
            selected: None,
            attempted: false,
            facilities_error: None,
            zones_error: None,
        }
    }

    /// Fetch the facility list on first use. Later calls return the cached
    /// list without a request, even if the first attempt failed.
    pub async fn load(&mut self) -> &[Facility] {
        if !self.attempted {
            self.fetch_facilities().await;
        }
        &self.facilities
    }

    /// Manual retry of the facility fetch.
    pub async fn reload(&mut self) -> &[Facility] {
        self.fetch_facilities().await;
        &self.facilities
    }

    /// Change the selected facility and rebuild the zone list.
    ///
    /// `None` clears the zones without a request. A facility record with a
    /// non-empty nested zone list is used as-is; otherwise one secondary
    /// fetch is issued.
    pub async fn select_facility(&mut self, facility_id: Option<FacilityId>) -> &[Zone] {
        self.zones.clear();
        self.zones_error = None;
        self.selected = facility_id;

        let Some(id) = facility_id else {
            return &self.zones;
        };

        let embedded = self
            .facility(id)
            .and_then(|f| f.zones.as_ref())
            .filter(|zones| !zones.is_empty())
            .cloned();

        if let Some(zones) = embedded {
            debug!(facility_id = id, count = zones.len(), "using nested zones");
            self.zones = zones;
            return &self.zones;
        }

        match self.source.facility_zones(id).await {
            Ok(zones) => self.zones = zones,
            Err(e) => {
                warn!(facility_id = id, error = %e, "zone fetch failed");
                self.zones_error = Some(e.display_message());
            }
        }
        &self.zones
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn selected(&self) -> Option<FacilityId> {
        self.selected
    }

    /// Why the last facility fetch failed, until one succeeds.
    pub fn facilities_error(&self) -> Option<&str> {
        self.facilities_error.as_deref()
    }

    /// Why the zones of the selected facility could not be fetched.
    pub fn zones_error(&self) -> Option<&str> {
        self.zones_error.as_deref()
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    async fn fetch_facilities(&mut self) {
        self.attempted = true;
        match self.source.facilities().await {
            Ok(facilities) => {
                debug!(count = facilities.len(), "facilities loaded");
                self.facilities = facilities;
                self.facilities_error = None;
            }
            Err(e) => {
                warn!(error = %e, "facility fetch failed");
                self.facilities_error = Some(e.display_message());
            }
        }
    }
}
