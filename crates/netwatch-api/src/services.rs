// Monitored-service endpoints and the network scan trigger

use tracing::debug;

use crate::client::{Ack, DashClient};
use crate::error::Error;
use crate::models::{ScanDevice, ServiceEntry, ServicePayload};

impl DashClient {
    /// List monitored services with their freshly probed status.
    ///
    /// `GET /api/services`
    pub async fn list_services(&self) -> Result<Vec<ServiceEntry>, Error> {
        let url = self.api_url("services");
        debug!("listing services");
        self.get(url).await
    }

    /// Create a new monitored service.
    ///
    /// `POST /api/services` — `payload.id` must be `None`.
    pub async fn create_service(&self, payload: &ServicePayload) -> Result<(), Error> {
        let url = self.api_url("services");
        debug!(name = %payload.name, "creating service");
        let ack: Ack = self.post(url, payload).await?;
        ack.into_result()
    }

    /// Update an existing monitored service.
    ///
    /// `PUT /api/services` — `payload.id` must be `Some`.
    pub async fn update_service(&self, payload: &ServicePayload) -> Result<(), Error> {
        let url = self.api_url("services");
        debug!(id = ?payload.id, "updating service");
        let ack: Ack = self.put(url, payload).await?;
        ack.into_result()
    }

    /// Delete a monitored service.
    ///
    /// `DELETE /api/services/{id}`
    pub async fn delete_service(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("services/{id}"));
        debug!(id, "deleting service");
        let ack: Ack = self.delete(url).await?;
        ack.into_result()
    }

    /// Trigger an ARP scan of the local network.
    ///
    /// `GET /api/network/scan` — blocking on the server side, so this can
    /// take several seconds.
    pub async fn scan_network(&self) -> Result<Vec<ScanDevice>, Error> {
        let url = self.api_url("network/scan");
        debug!("scanning network");
        self.get(url).await
    }
}
