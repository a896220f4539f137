// Facility and zone lookup endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Facility, FacilityId, Zone};

impl ApiClient {
    /// Every facility, with zones nested when the backend provides them.
    ///
    /// `GET /facilities/`
    pub async fn facilities(&self) -> Result<Vec<Facility>, Error> {
        let url = self.url("facilities/")?;
        self.get(url).await
    }

    /// Zones of one facility, for facility records without nested zones.
    ///
    /// `GET /facilities/{id}/zones/`
    pub async fn facility_zones(&self, facility_id: FacilityId) -> Result<Vec<Zone>, Error> {
        let url = self.url(&format!("facilities/{facility_id}/zones/"))?;
        debug!(facility_id, "fetching facility zones");
        self.get(url).await
    }
}
