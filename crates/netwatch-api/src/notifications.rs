// Notification endpoints

use tracing::debug;

use crate::client::{Ack, DashClient};
use crate::error::Error;
use crate::models::NotificationsPayload;

impl DashClient {
    /// Fetch the notification feed (badge count + recent list).
    ///
    /// `GET /api/notifications` — tolerates both the `{unread_count, list}`
    /// shape and the legacy bare array.
    pub async fn get_notifications(&self) -> Result<NotificationsPayload, Error> {
        let url = self.api_url("notifications");
        debug!("fetching notifications");
        self.get(url).await
    }

    /// Mark every notification as read.
    ///
    /// `POST /api/notifications/mark_read` — callers re-poll afterwards
    /// rather than mutating local state.
    pub async fn mark_notifications_read(&self) -> Result<(), Error> {
        let url = self.api_url("notifications/mark_read");
        debug!("marking notifications read");
        let ack: Ack = self.post_empty(url).await?;
        ack.into_result()
    }
}
