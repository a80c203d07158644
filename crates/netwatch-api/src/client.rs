// Dashboard API HTTP client
//
// Wraps `reqwest::Client` with backend-specific URL construction and JSON
// decoding. Endpoint groups (metrics, services, notifications) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::PublicIpResponse;
use crate::transport::TransportConfig;

const PUBLIC_IP_URL: &str = "https://api.ipify.org?format=json";

/// Acknowledgment body returned by mutation endpoints:
/// `{ "status": "success" | "error", "message": "..." }`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Ack {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    /// Convert a decoded acknowledgment into a `Result`.
    pub(crate) fn into_result(self) -> Result<(), Error> {
        if self.status == "success" {
            Ok(())
        } else {
            Err(Error::Rejected {
                message: self.message.unwrap_or(self.status),
            })
        }
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP client for the dashboard backend's JSON API.
///
/// All endpoints live under `{base}/api/`; responses are plain JSON with no
/// envelope. Methods return decoded payloads and surface non-2xx responses
/// as [`Error::Api`].
#[derive(Clone)]
pub struct DashClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://192.168.1.50:5000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request with an empty body and decode the response.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a PUT request with a JSON body and decode the response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a DELETE request and decode the response.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Check the HTTP status and decode the JSON body.
    ///
    /// Non-2xx responses become [`Error::Api`], carrying the server's
    /// `message` field when the body has one. Decode failures keep the raw
    /// body for debugging.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_owned()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    // ── One-shot lookups ─────────────────────────────────────────────

    /// Fetch the public IP address from ipify.
    ///
    /// This is the only request that leaves the backend; callers treat
    /// failure as non-fatal (the readout renders as unknown).
    pub async fn fetch_public_ip(&self) -> Result<String, Error> {
        debug!("GET {}", PUBLIC_IP_URL);

        let resp = self
            .http
            .get(PUBLIC_IP_URL)
            .send()
            .await
            .map_err(Error::Transport)?;
        let decoded: PublicIpResponse = Self::decode(resp).await?;
        Ok(decoded.ip)
    }
}
