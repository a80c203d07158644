// Telemetry endpoints
//
// Host/network metrics and the gateway latency probe. Both are read-only
// and polled on fixed periods by netwatch-core.

use tracing::debug;

use crate::client::DashClient;
use crate::error::Error;
use crate::models::{MetricsResponse, PingResponse};

impl DashClient {
    /// Fetch host and network telemetry.
    ///
    /// `GET /api/metrics`
    pub async fn get_metrics(&self) -> Result<MetricsResponse, Error> {
        let url = self.api_url("metrics");
        debug!("fetching metrics");
        self.get(url).await
    }

    /// Run the backend's latency probe.
    ///
    /// `GET /api/ping`
    pub async fn get_ping(&self) -> Result<PingResponse, Error> {
        let url = self.api_url("ping");
        debug!("fetching ping");
        self.get(url).await
    }
}
