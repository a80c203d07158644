// netwatch-core: client-side real-time state engine for the dashboard.
//
// Four independent pollers drive a reactive store: host/network metrics
// (with cumulative-counter → rate derivation per interface), the gateway
// latency probe, monitored-service health, and the notification feed.
// Consumers subscribe to watch channels and the toast broadcast; nothing
// here touches a terminal or a config file.

pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod store;
pub mod traffic;

pub use chart::ChartBuffer;
pub use config::DashboardConfig;
pub use controller::{DashboardController, TOTAL_INTERFACE};
pub use error::CoreError;
pub use notify::NotificationFeed;
pub use store::{DashboardStore, NotificationState, PingSnapshot, SystemSnapshot};
pub use traffic::{Throughput, TrafficTracker};

// The API models are already domain-shaped; re-export the ones consumers
// bind to instead of duplicating them.
pub use netwatch_api::models::{
    ConnectionEntry, Notification, ScanDevice, ServiceEntry, ServiceKind, ServiceStatus, Severity,
};
