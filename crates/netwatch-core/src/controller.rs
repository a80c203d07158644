// ── Dashboard controller ──
//
// Owns the poller lifecycles, the selected network interface, and the
// command surface (service CRUD, mark-read, scan). Pollers are independent
// interval tasks; a slow or failing poll never delays the others, and the
// next scheduled tick is the retry.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use netwatch_api::DashClient;
use netwatch_api::models::{
    MetricsResponse, NotificationsPayload, PingResponse, ScanDevice, ServiceKind, ServicePayload,
};
use netwatch_api::transport::TransportConfig;

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::notify::NotificationFeed;
use crate::store::{DashboardStore, NotificationState, PingSnapshot, SystemSnapshot};
use crate::traffic::TrafficTracker;

/// Synthetic interface id for the all-interfaces aggregate.
pub const TOTAL_INTERFACE: &str = "total";

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<Inner>`. Call [`start()`](Self::start) to
/// spawn the pollers and [`shutdown()`](Self::shutdown) to stop them.
#[derive(Clone)]
pub struct DashboardController {
    inner: Arc<Inner>,
}

struct Inner {
    config: DashboardConfig,
    client: DashClient,
    store: Arc<DashboardStore>,
    /// Counter baselines; written only inside a single metrics tick.
    traffic: Mutex<TrafficTracker>,
    /// Toast high-water mark; written by the notifications tick and the
    /// mark-all-read re-poll.
    feed: Mutex<NotificationFeed>,
    selected: watch::Sender<String>,
    public_ip: watch::Sender<Option<String>>,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardController {
    /// Create a controller from configuration. Does NOT poll -- call
    /// [`start()`](Self::start) to spawn the background tasks.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let client = DashClient::new(config.url.clone(), &transport)?;
        let store = Arc::new(DashboardStore::new(
            config.network_window,
            config.ping_window,
        ));
        let (selected, _) = watch::channel(TOTAL_INTERFACE.to_owned());
        let (public_ip, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                client,
                store,
                traffic: Mutex::new(TrafficTracker::new()),
                feed: Mutex::new(NotificationFeed::new()),
                selected,
                public_ip,
                cancel: CancellationToken::new(),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the four pollers and the one-shot public-IP lookup.
    ///
    /// Each poller fires immediately and then on its fixed period. Pollers
    /// never stop on failure; failed ticks are logged and the next tick
    /// retries.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        let config = &self.inner.config;

        handles.push(tokio::spawn(metrics_poll_task(
            self.clone(),
            config.metrics_interval,
            self.inner.cancel.clone(),
        )));
        handles.push(tokio::spawn(ping_poll_task(
            self.clone(),
            config.ping_interval,
            self.inner.cancel.clone(),
        )));
        handles.push(tokio::spawn(services_poll_task(
            self.clone(),
            config.services_interval,
            self.inner.cancel.clone(),
        )));
        handles.push(tokio::spawn(notifications_poll_task(
            self.clone(),
            config.notifications_interval,
            self.inner.cancel.clone(),
        )));

        // One-shot public IP lookup; failure renders as unknown.
        let ctrl = self.clone();
        handles.push(tokio::spawn(async move {
            match ctrl.inner.client.fetch_public_ip().await {
                Ok(ip) => {
                    let _ = ctrl.inner.public_ip.send(Some(ip));
                }
                Err(e) => debug!(error = %e, "public IP lookup failed"),
            }
        }));

        info!("dashboard pollers started");
    }

    /// Cancel the pollers and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("dashboard pollers stopped");
    }

    // ── Interface selection ──────────────────────────────────────────

    /// Subscribe to the selected-interface id.
    pub fn selected_interface(&self) -> watch::Receiver<String> {
        self.inner.selected.subscribe()
    }

    /// The currently selected interface id.
    pub fn current_interface(&self) -> String {
        self.inner.selected.borrow().clone()
    }

    /// Change the displayed interface.
    ///
    /// Takes effect on the next metrics tick. Chart history already drawn
    /// stays; the same visual series continues, fed by the new interface's
    /// rate. Because every interface is baselined on every poll, switching
    /// reads against a fresh counter — an interface the tracker has never
    /// seen yields one unavailable tick instead of a spike, and other
    /// interfaces' baselines are untouched.
    pub fn select_interface(&self, interface: &str) {
        if *self.inner.selected.borrow() == interface {
            return;
        }
        debug!(interface, "interface selected");
        self.inner.selected.send_replace(interface.to_owned());
    }

    /// Subscribe to the public IP readout.
    pub fn public_ip(&self) -> watch::Receiver<Option<String>> {
        self.inner.public_ip.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create (`id: None`) or update (`id: Some`) a monitored service.
    ///
    /// Empty name or url is rejected locally before any request is issued.
    /// On success the service list is re-polled.
    pub async fn save_service(
        &self,
        id: Option<i64>,
        name: &str,
        url: &str,
        kind: ServiceKind,
    ) -> Result<(), CoreError> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "service name and url are required".into(),
            });
        }

        let payload = ServicePayload {
            id,
            name: name.to_owned(),
            url: url.to_owned(),
            kind,
        };
        if id.is_some() {
            self.inner.client.update_service(&payload).await?;
        } else {
            self.inner.client.create_service(&payload).await?;
        }

        self.refresh_services().await
    }

    /// Delete a monitored service, then re-poll the list.
    pub async fn delete_service(&self, id: i64) -> Result<(), CoreError> {
        self.inner.client.delete_service(id).await?;
        self.refresh_services().await
    }

    /// Mark every notification as read.
    ///
    /// Pure pass-through to the backend; on success the feed is re-polled
    /// rather than mutated locally, staying consistent with server truth.
    pub async fn mark_all_read(&self) -> Result<(), CoreError> {
        self.inner.client.mark_notifications_read().await?;

        let payload = self.inner.client.get_notifications().await?;
        self.apply_notifications(&payload);
        Ok(())
    }

    /// Trigger a network scan and return the discovered devices.
    pub async fn scan_network(&self) -> Result<Vec<ScanDevice>, CoreError> {
        Ok(self.inner.client.scan_network().await?)
    }

    /// Fetch the service list and publish it to the store.
    pub async fn refresh_services(&self) -> Result<(), CoreError> {
        let services = self.inner.client.list_services().await?;
        self.inner.store.services.send_replace(Arc::new(services));
        Ok(())
    }

    // ── State application ────────────────────────────────────────────
    //
    // Pure (no I/O) per-tick updates. Each runs to completion between
    // suspension points, so baselines and the cursor are never read-modify-
    // written across an await.

    fn apply_metrics(&self, metrics: &MetricsResponse, now: DateTime<Utc>) {
        let selected = self.current_interface();
        let store = &self.inner.store;

        // Baseline every interface present in the response, not only the
        // selected one.
        let mut rate = None;
        {
            let mut traffic = self.inner.traffic.lock().expect("traffic lock");
            let total_rate = traffic.record(
                TOTAL_INTERFACE,
                metrics.network.total.bytes_sent,
                metrics.network.total.bytes_recv,
                now,
            );
            if selected == TOTAL_INTERFACE {
                rate = total_rate;
            }
            for (interface, counters) in &metrics.network.interfaces {
                let iface_rate =
                    traffic.record(interface, counters.bytes_sent, counters.bytes_recv, now);
                if *interface == selected {
                    rate = iface_rate;
                }
            }
        }

        // Unavailable rate renders as no chart update, never a zero point.
        if let Some(rate) = rate {
            let label = now.with_timezone(&Local).format("%H:%M:%S").to_string();
            store.push_network_sample(&label, rate.sent_bps, rate.recv_bps);
        }

        let interface_ip = metrics
            .network
            .interfaces
            .get(&selected)
            .and_then(|c| c.address())
            .map(str::to_owned);

        let selected_counters = if selected == TOTAL_INTERFACE {
            Some(&metrics.network.total)
        } else {
            metrics.network.interfaces.get(&selected)
        };

        let mut interfaces: Vec<String> = metrics.network.interfaces.keys().cloned().collect();
        interfaces.sort();

        store.system.send_replace(Some(SystemSnapshot {
            cpu_pct: metrics.cpu,
            memory_pct: metrics.memory.percent,
            rate,
            bytes_sent: selected_counters.map_or(0, |c| c.bytes_sent),
            bytes_recv: selected_counters.map_or(0, |c| c.bytes_recv),
            interface_ip,
            interfaces,
            connections: Arc::new(metrics.network.connections.clone()),
        }));
        store.last_refresh.send_replace(Some(now));
    }

    fn apply_ping(&self, ping: &PingResponse, now: DateTime<Utc>) {
        let latency = ping.latency_ms();

        // A failed probe plots as zero so the outage is visible in the
        // chart; the readout reports the failure separately.
        let label = now.with_timezone(&Local).format("%H:%M:%S").to_string();
        self.inner
            .store
            .push_ping_sample(&label, latency.unwrap_or(0.0));

        self.inner.store.ping.send_replace(Some(PingSnapshot {
            latency_ms: latency,
            reachable: ping.is_ok(),
        }));
    }

    fn apply_notifications(&self, payload: &NotificationsPayload) {
        let newly = {
            let mut feed = self.inner.feed.lock().expect("feed lock");
            feed.reconcile(payload.list())
        };

        self.inner
            .store
            .notifications
            .send_replace(NotificationState {
                unread: NotificationFeed::unread_count(payload),
                list: Arc::new(payload.list().to_vec()),
            });

        for notification in newly {
            let _ = self.inner.store.toast_tx.send(Arc::new(notification));
        }
    }
}

// ── Poll tasks ───────────────────────────────────────────────────────
//
// Each task owns its period and applies only its own domain. The first
// tick of `tokio::time::interval` completes immediately, giving the same
// fetch-once-at-startup behavior the dashboard needs.

async fn metrics_poll_task(
    controller: DashboardController,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match controller.inner.client.get_metrics().await {
                    Ok(metrics) => controller.apply_metrics(&metrics, Utc::now()),
                    Err(e) => debug!(error = %e, "metrics poll failed"),
                }
            }
        }
    }
}

async fn ping_poll_task(
    controller: DashboardController,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match controller.inner.client.get_ping().await {
                    Ok(ping) => controller.apply_ping(&ping, Utc::now()),
                    Err(e) => debug!(error = %e, "ping poll failed"),
                }
            }
        }
    }
}

async fn services_poll_task(
    controller: DashboardController,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.refresh_services().await {
                    warn!(error = %e, "services poll failed");
                }
            }
        }
    }
}

async fn notifications_poll_task(
    controller: DashboardController,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match controller.inner.client.get_notifications().await {
                    Ok(payload) => controller.apply_notifications(&payload),
                    Err(e) => debug!(error = %e, "notifications poll failed"),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeDelta;
    use netwatch_api::models::{
        InterfaceCounters, MemoryStats, NetworkStats, Notification, Severity,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn controller() -> DashboardController {
        DashboardController::new(DashboardConfig::default()).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn counters(sent: u64, recv: u64, ip: Option<&str>) -> InterfaceCounters {
        InterfaceCounters {
            bytes_sent: sent,
            bytes_recv: recv,
            ip: ip.map(str::to_owned),
        }
    }

    fn metrics(total: (u64, u64), eth0: (u64, u64)) -> MetricsResponse {
        let mut interfaces = HashMap::new();
        interfaces.insert(
            "eth0".to_owned(),
            counters(eth0.0, eth0.1, Some("192.168.1.50")),
        );
        MetricsResponse {
            cpu: 12.0,
            memory: MemoryStats { percent: 40.0 },
            network: NetworkStats {
                total: counters(total.0, total.1, None),
                interfaces,
                connections: Vec::new(),
            },
        }
    }

    fn notif(id: u64, read: bool) -> Notification {
        Notification {
            id,
            title: "t".into(),
            message: "m".into(),
            severity: Severity::Info,
            read,
            time: "12:00:00".into(),
        }
    }

    #[tokio::test]
    async fn first_metrics_tick_yields_no_rate_or_chart_point() {
        let ctrl = controller();

        ctrl.apply_metrics(&metrics((1000, 2000), (600, 1500)), t0());

        let snapshot = ctrl.store().system_snapshot().unwrap();
        assert!(snapshot.rate.is_none());
        ctrl.store().with_network_chart(|c| assert!(c.is_empty()));
        assert_eq!(ctrl.store().last_refresh(), Some(t0()));
    }

    #[tokio::test]
    async fn second_metrics_tick_derives_rate_and_pushes_chart_point() {
        let ctrl = controller();

        ctrl.apply_metrics(&metrics((1000, 2000), (600, 1500)), t0());
        ctrl.apply_metrics(
            &metrics((2000, 2500), (700, 1600)),
            t0() + TimeDelta::milliseconds(1000),
        );

        let snapshot = ctrl.store().system_snapshot().unwrap();
        let rate = snapshot.rate.unwrap();
        assert_eq!(rate.sent_bps, 1000.0);
        assert_eq!(rate.recv_bps, 500.0);

        ctrl.store().with_network_chart(|chart| {
            assert_eq!(chart.len(), 1);
            assert_eq!(chart.latest(0), Some(1000.0));
            assert_eq!(chart.latest(1), Some(500.0));
        });
    }

    #[tokio::test]
    async fn switching_interface_uses_its_passive_baseline() {
        let ctrl = controller();

        // eth0 baselined passively while "total" is displayed.
        ctrl.apply_metrics(&metrics((1000, 2000), (600, 1500)), t0());
        ctrl.select_interface("eth0");
        ctrl.apply_metrics(
            &metrics((2000, 2500), (800, 1900)),
            t0() + TimeDelta::seconds(2),
        );

        let snapshot = ctrl.store().system_snapshot().unwrap();
        let rate = snapshot.rate.unwrap();
        assert_eq!(rate.sent_bps, 100.0);
        assert_eq!(rate.recv_bps, 200.0);
        assert_eq!(snapshot.interface_ip.as_deref(), Some("192.168.1.50"));
    }

    #[tokio::test]
    async fn switching_to_unseen_interface_gives_one_unavailable_tick() {
        let ctrl = controller();
        ctrl.apply_metrics(&metrics((1000, 2000), (600, 1500)), t0());

        ctrl.select_interface("wlan0");
        let mut payload = metrics((2000, 2500), (700, 1600));
        payload
            .network
            .interfaces
            .insert("wlan0".to_owned(), counters(50, 60, None));
        ctrl.apply_metrics(&payload, t0() + TimeDelta::seconds(2));

        // No spike from a stale counter: the first post-switch tick is
        // unavailable and the chart gets no point from it.
        let snapshot = ctrl.store().system_snapshot().unwrap();
        assert!(snapshot.rate.is_none());
        ctrl.store().with_network_chart(|c| assert!(c.is_empty()));

        // The next tick has a baseline and produces a rate.
        let mut payload = metrics((3000, 3500), (800, 1700));
        payload
            .network
            .interfaces
            .insert("wlan0".to_owned(), counters(250, 460, None));
        ctrl.apply_metrics(&payload, t0() + TimeDelta::seconds(4));

        let rate = ctrl.store().system_snapshot().unwrap().rate.unwrap();
        assert_eq!(rate.sent_bps, 100.0);
        assert_eq!(rate.recv_bps, 200.0);
    }

    #[tokio::test]
    async fn ping_failure_plots_zero_and_reports_unreachable() {
        let ctrl = controller();

        ctrl.apply_ping(
            &PingResponse {
                status: "ok".into(),
                latency: Some(12.5),
                target: None,
            },
            t0(),
        );
        ctrl.apply_ping(
            &PingResponse {
                status: "error".into(),
                latency: Some(-1.0),
                target: None,
            },
            t0() + TimeDelta::seconds(5),
        );

        let snapshot = ctrl.store().ping_snapshot().unwrap();
        assert!(!snapshot.reachable);
        assert!(snapshot.latency_ms.is_none());

        ctrl.store().with_ping_chart(|chart| {
            assert_eq!(chart.len(), 2);
            assert_eq!(chart.series(0).collect::<Vec<_>>(), [12.5, 0.0]);
        });
    }

    #[tokio::test]
    async fn toasts_fire_only_for_newly_surfaced_notifications() {
        let ctrl = controller();
        let mut toasts = ctrl.store().subscribe_toasts();

        ctrl.apply_notifications(&NotificationsPayload::Feed {
            unread_count: Some(1),
            list: vec![notif(5, false)],
        });
        assert!(toasts.try_recv().is_err());
        assert_eq!(ctrl.store().notification_state().unread, 1);

        ctrl.apply_notifications(&NotificationsPayload::Feed {
            unread_count: Some(2),
            list: vec![notif(6, false), notif(5, false)],
        });

        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.id, 6);
        assert!(toasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn legacy_payload_derives_unread_count() {
        let ctrl = controller();

        ctrl.apply_notifications(&NotificationsPayload::Legacy(vec![
            notif(2, false),
            notif(1, true),
        ]));

        assert_eq!(ctrl.store().notification_state().unread, 1);
    }

    #[tokio::test]
    async fn save_service_rejects_blank_input_before_any_request() {
        let ctrl = controller();

        let result = ctrl.save_service(None, "  ", "10.0.0.1", ServiceKind::Ping).await;
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));

        let result = ctrl.save_service(None, "router", "", ServiceKind::Ping).await;
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    }
}
