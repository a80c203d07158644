//! Data bridge — connects [`DashboardController`] state to TUI actions.
//!
//! Runs as a background task: starts the pollers, subscribes to the store's
//! watch channels and the toast broadcast, and forwards every change as an
//! [`Action`] through the TUI's action channel. Shuts down the controller
//! cleanly on cancellation.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use netwatch_core::DashboardController;

use crate::action::Action;

pub async fn spawn_data_bridge(
    controller: DashboardController,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Subscribe before the pollers start so the first results are never
    // marked as already seen.
    let store = controller.store().clone();
    let mut system = store.subscribe_system();
    let mut ping = store.subscribe_ping();
    let mut services = store.subscribe_services();
    let mut notifications = store.subscribe_notifications();
    let mut toasts = store.subscribe_toasts();
    let mut public_ip = controller.public_ip();
    let mut selected = controller.selected_interface();

    controller.start().await;

    // Stream loop — forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = system.changed() => {
                let snapshot = system.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    let _ = action_tx.send(Action::SystemUpdated(snapshot));
                }
            }
            Ok(()) = ping.changed() => {
                let snapshot = *ping.borrow_and_update();
                if let Some(snapshot) = snapshot {
                    let _ = action_tx.send(Action::PingUpdated(snapshot));
                }
            }
            Ok(()) = services.changed() => {
                let list = services.borrow_and_update().clone();
                let _ = action_tx.send(Action::ServicesUpdated(list));
            }
            Ok(()) = notifications.changed() => {
                let state = notifications.borrow_and_update().clone();
                let _ = action_tx.send(Action::NotificationsUpdated(state));
            }
            Ok(toast) = toasts.recv() => {
                let _ = action_tx.send(Action::Toast(toast));
            }
            Ok(()) = public_ip.changed() => {
                let ip = public_ip.borrow_and_update().clone();
                if let Some(ip) = ip {
                    let _ = action_tx.send(Action::PublicIpResolved(ip));
                }
            }
            Ok(()) = selected.changed() => {
                let interface = selected.borrow_and_update().clone();
                let _ = action_tx.send(Action::InterfaceChanged(interface));
            }
        }
    }

    controller.shutdown().await;
    debug!("data bridge shut down");
}
