// ── Runtime dashboard configuration ──
//
// Describes *which* backend to poll and how fast. Built by the TUI (from
// CLI flags or the config file) and handed in -- core never reads disk.

use std::time::Duration;

use url::Url;

/// Configuration for a single dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g. `http://192.168.1.50:5000`).
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Host/network metrics poll period.
    pub metrics_interval: Duration,
    /// Gateway latency probe poll period.
    pub ping_interval: Duration,
    /// Monitored-services poll period.
    pub services_interval: Duration,
    /// Notification feed poll period.
    pub notifications_interval: Duration,
    /// Network chart window (points kept).
    pub network_window: usize,
    /// Ping chart window (points kept).
    pub ping_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".parse().expect("default backend URL"),
            timeout: Duration::from_secs(10),
            metrics_interval: Duration::from_secs(2),
            ping_interval: Duration::from_secs(5),
            services_interval: Duration::from_secs(10),
            notifications_interval: Duration::from_secs(5),
            network_window: 30,
            ping_window: 20,
        }
    }
}
