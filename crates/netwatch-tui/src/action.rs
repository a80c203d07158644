//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use netwatch_core::{
    Notification, NotificationState, PingSnapshot, ScanDevice, ServiceEntry, ServiceKind,
    SystemSnapshot,
};

/// Top-level screens, navigable by number key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenId {
    #[default]
    Dashboard,
    Services,
}

impl ScreenId {
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Services => "Services",
        }
    }
}

/// UI actions dispatched through the app's action channel.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Data updates from the bridge ─────────────────────────────────
    SystemUpdated(SystemSnapshot),
    PingUpdated(PingSnapshot),
    ServicesUpdated(Arc<Vec<ServiceEntry>>),
    NotificationsUpdated(NotificationState),
    Toast(Arc<Notification>),
    PublicIpResolved(String),
    InterfaceChanged(String),

    // ── UI intents ───────────────────────────────────────────────────
    Quit,
    Render,
    Tick,
    Resize(u16, u16),
    SwitchScreen(ScreenId),
    ToggleHelp,
    CycleInterface,
    ToggleIpMask,
    ToggleNotifications,
    MarkAllRead,

    // ── Service management ───────────────────────────────────────────
    SubmitService {
        id: Option<i64>,
        name: String,
        url: String,
        kind: ServiceKind,
    },
    DeleteService(i64),
    ServiceSaved,
    StartScan,
    ScanFinished(Vec<ScanDevice>),

    // ── Command feedback ─────────────────────────────────────────────
    CommandFailed(String),
}
