// ── Reactive dashboard state ──
//
// One snapshot channel per data domain, chart buffers behind locks with
// version counters, and a broadcast channel for transient toasts. Each
// domain has exactly one writer (its poll task); everything else reads.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};

use netwatch_api::models::{ConnectionEntry, Notification, ServiceEntry};

use crate::chart::ChartBuffer;
use crate::traffic::Throughput;

const TOAST_CHANNEL_SIZE: usize = 64;

/// Host/network readout derived from one metrics poll.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub cpu_pct: f64,
    pub memory_pct: f64,
    /// Throughput of the selected interface; `None` when no rate could be
    /// derived this tick (first sample, zero elapsed).
    pub rate: Option<Throughput>,
    /// Cumulative counters of the selected interface.
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    /// Address of the selected interface (`None` for the aggregate view or
    /// when the backend has no address for it).
    pub interface_ip: Option<String>,
    /// Discovered interface ids, sorted.
    pub interfaces: Vec<String>,
    pub connections: Arc<Vec<ConnectionEntry>>,
}

/// Latest gateway latency probe result.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingSnapshot {
    /// `None` when the probe failed.
    pub latency_ms: Option<f64>,
    pub reachable: bool,
}

/// Notification badge + list state.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub unread: u64,
    pub list: Arc<Vec<Notification>>,
}

/// Central reactive store for all dashboard state.
///
/// Snapshot domains are `watch` channels; chart buffers sit behind `RwLock`
/// with a `watch<u64>` revision that bumps on every push, so the render
/// surface redraws on change without full-buffer replacement.
pub struct DashboardStore {
    pub(crate) system: watch::Sender<Option<SystemSnapshot>>,
    pub(crate) ping: watch::Sender<Option<PingSnapshot>>,
    pub(crate) services: watch::Sender<Arc<Vec<ServiceEntry>>>,
    pub(crate) notifications: watch::Sender<NotificationState>,
    pub(crate) toast_tx: broadcast::Sender<Arc<Notification>>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,

    network_chart: RwLock<ChartBuffer>,
    network_chart_rev: watch::Sender<u64>,
    ping_chart: RwLock<ChartBuffer>,
    ping_chart_rev: watch::Sender<u64>,
}

impl DashboardStore {
    /// Create a store with the given chart window capacities.
    pub fn new(network_window: usize, ping_window: usize) -> Self {
        let (system, _) = watch::channel(None);
        let (ping, _) = watch::channel(None);
        let (services, _) = watch::channel(Arc::new(Vec::new()));
        let (notifications, _) = watch::channel(NotificationState::default());
        let (toast_tx, _) = broadcast::channel(TOAST_CHANNEL_SIZE);
        let (last_refresh, _) = watch::channel(None);
        let (network_chart_rev, _) = watch::channel(0);
        let (ping_chart_rev, _) = watch::channel(0);

        Self {
            system,
            ping,
            services,
            notifications,
            toast_tx,
            last_refresh,
            network_chart: RwLock::new(ChartBuffer::new(network_window, 2)),
            network_chart_rev,
            ping_chart: RwLock::new(ChartBuffer::new(ping_window, 1)),
            ping_chart_rev,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn system_snapshot(&self) -> Option<SystemSnapshot> {
        self.system.borrow().clone()
    }

    pub fn ping_snapshot(&self) -> Option<PingSnapshot> {
        *self.ping.borrow()
    }

    pub fn services_snapshot(&self) -> Arc<Vec<ServiceEntry>> {
        self.services.borrow().clone()
    }

    pub fn notification_state(&self) -> NotificationState {
        self.notifications.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_system(&self) -> watch::Receiver<Option<SystemSnapshot>> {
        self.system.subscribe()
    }

    pub fn subscribe_ping(&self) -> watch::Receiver<Option<PingSnapshot>> {
        self.ping.subscribe()
    }

    pub fn subscribe_services(&self) -> watch::Receiver<Arc<Vec<ServiceEntry>>> {
        self.services.subscribe()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<NotificationState> {
        self.notifications.subscribe()
    }

    /// Subscribe to the transient toast stream.
    pub fn subscribe_toasts(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.toast_tx.subscribe()
    }

    pub fn subscribe_network_chart(&self) -> watch::Receiver<u64> {
        self.network_chart_rev.subscribe()
    }

    pub fn subscribe_ping_chart(&self) -> watch::Receiver<u64> {
        self.ping_chart_rev.subscribe()
    }

    // ── Chart access ─────────────────────────────────────────────────

    /// Read the network chart window (series 0 = sent, 1 = received).
    pub fn with_network_chart<R>(&self, f: impl FnOnce(&ChartBuffer) -> R) -> R {
        f(&self.network_chart.read().expect("network chart lock"))
    }

    /// Read the ping chart window (series 0 = latency ms).
    pub fn with_ping_chart<R>(&self, f: impl FnOnce(&ChartBuffer) -> R) -> R {
        f(&self.ping_chart.read().expect("ping chart lock"))
    }

    /// Append a network sample and bump the chart revision.
    pub(crate) fn push_network_sample(&self, label: &str, sent_bps: f64, recv_bps: f64) {
        self.network_chart
            .write()
            .expect("network chart lock")
            .push(label, &[sent_bps, recv_bps]);
        self.network_chart_rev.send_modify(|rev| *rev += 1);
    }

    /// Append a ping sample and bump the chart revision.
    pub(crate) fn push_ping_sample(&self, label: &str, latency_ms: f64) {
        self.ping_chart
            .write()
            .expect("ping chart lock")
            .push(label, &[latency_ms]);
        self.ping_chart_rev.send_modify(|rev| *rev += 1);
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last metrics poll succeeded, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chart_revision_bumps_on_push() {
        let store = DashboardStore::new(30, 20);
        let rx = store.subscribe_network_chart();
        assert_eq!(*rx.borrow(), 0);

        store.push_network_sample("10:00:00", 100.0, 200.0);
        store.push_network_sample("10:00:02", 150.0, 250.0);

        assert_eq!(*rx.borrow(), 2);
        store.with_network_chart(|chart| {
            assert_eq!(chart.len(), 2);
            assert_eq!(chart.latest(0), Some(150.0));
            assert_eq!(chart.latest(1), Some(250.0));
        });
    }

    #[test]
    fn snapshots_start_empty() {
        let store = DashboardStore::new(30, 20);

        assert!(store.system_snapshot().is_none());
        assert!(store.ping_snapshot().is_none());
        assert!(store.services_snapshot().is_empty());
        assert_eq!(store.notification_state().unread, 0);
        assert!(store.last_refresh().is_none());
    }
}
