// Backend API response types
//
// Models for the dashboard backend's JSON API. Fields use `#[serde(default)]`
// where the backend has historically omitted them, and the notifications
// payload tolerates the pre-0.9 bare-array shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Metrics ──────────────────────────────────────────────────────────

/// Full payload from `GET /api/metrics`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsResponse {
    /// CPU utilization percentage.
    pub cpu: f64,
    pub memory: MemoryStats,
    pub network: NetworkStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryStats {
    /// Memory utilization percentage.
    pub percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkStats {
    /// Aggregate counters across all interfaces.
    pub total: InterfaceCounters,
    /// Per-interface counters, keyed by interface id (e.g. `eth0`).
    #[serde(default)]
    pub interfaces: HashMap<String, InterfaceCounters>,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

/// Cumulative byte counters for a single interface.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    #[serde(default)]
    pub ip: Option<String>,
}

impl InterfaceCounters {
    /// The interface address, filtering the backend's `"N/A"` placeholder.
    pub fn address(&self) -> Option<&str> {
        self.ip.as_deref().filter(|ip| *ip != "N/A")
    }
}

/// One row of the active-connections table.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEntry {
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub pid: i64,
    #[serde(default)]
    pub laddr: String,
    #[serde(default)]
    pub raddr: String,
    #[serde(default)]
    pub status: String,
}

// ── Ping ─────────────────────────────────────────────────────────────

/// Payload from `GET /api/ping`.
///
/// `latency` is `-1` when `status` is `"error"`; use [`Self::latency_ms`].
#[derive(Debug, Clone, Deserialize)]
pub struct PingResponse {
    pub status: String,
    #[serde(default)]
    pub latency: Option<f64>,
    #[serde(default)]
    pub target: Option<String>,
}

impl PingResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Latency in milliseconds, `None` unless the probe succeeded.
    pub fn latency_ms(&self) -> Option<f64> {
        if self.is_ok() {
            self.latency.filter(|l| *l >= 0.0)
        } else {
            None
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

/// Notification severity. Unknown values decode as `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// A single server-owned notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    #[serde(default)]
    pub read: bool,
    /// Server-formatted timestamp (`HH:MM:SS`).
    #[serde(default)]
    pub time: String,
}

/// Payload from `GET /api/notifications`.
///
/// Current backends send `{ unread_count, list }`; older ones sent a bare
/// array with no count.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NotificationsPayload {
    Feed {
        #[serde(default)]
        unread_count: Option<u64>,
        list: Vec<Notification>,
    },
    Legacy(Vec<Notification>),
}

impl NotificationsPayload {
    pub fn list(&self) -> &[Notification] {
        match self {
            Self::Feed { list, .. } => list,
            Self::Legacy(list) => list,
        }
    }

    /// The server-provided unread count, if the response shape carried one.
    pub fn unread_count(&self) -> Option<u64> {
        match self {
            Self::Feed { unread_count, .. } => *unread_count,
            Self::Legacy(_) => None,
        }
    }
}

// ── Monitored services ───────────────────────────────────────────────

/// Probe type for a monitored service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ServiceKind {
    Http,
    Ping,
}

impl From<String> for ServiceKind {
    fn from(value: String) -> Self {
        if value == "ping" { Self::Ping } else { Self::Http }
    }
}

/// Last observed health of a monitored service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ServiceStatus {
    Up,
    Down,
}

impl From<String> for ServiceStatus {
    fn from(value: String) -> Self {
        if value == "Up" { Self::Up } else { Self::Down }
    }
}

/// One monitored service as returned by `GET /api/services`.
///
/// The list endpoint re-probes every service server-side, so `status` and
/// `response_time` are fresh on each poll.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub status: ServiceStatus,
    #[serde(default)]
    pub response_time: f64,
}

/// Request body for creating (POST, `id: None`) or updating (PUT,
/// `id: Some`) a monitored service.
#[derive(Debug, Clone, Serialize)]
pub struct ServicePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
}

// ── Network scan ─────────────────────────────────────────────────────

/// One device discovered by `GET /api/network/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanDevice {
    pub ip: String,
    #[serde(default)]
    pub mac: String,
}

// ── Public IP ────────────────────────────────────────────────────────

/// Payload from the ipify lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicIpResponse {
    pub ip: String,
}
