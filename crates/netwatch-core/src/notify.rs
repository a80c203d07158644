// ── Notification high-water-mark dedup ──
//
// The feed endpoint returns the most recent notifications on every poll.
// To surface each one as a toast exactly once, the feed tracks the highest
// id it has already seen. The cursor starts uninitialized so the first
// successful poll after startup never replays history as a toast storm.

use netwatch_api::models::{Notification, NotificationsPayload};

/// Tracks the highest notification id already surfaced as a toast.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    /// `None` until the first non-empty poll initializes it.
    cursor: Option<u64>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a freshly polled list against the cursor.
    ///
    /// Returns the notifications to surface as toasts: unread entries with
    /// an id above the cursor. While the cursor is uninitialized nothing is
    /// surfaced — the list is treated as pre-existing history. Afterwards
    /// the cursor advances to the highest id seen and never decreases, even
    /// if a later poll returns fewer or older items.
    pub fn reconcile(&mut self, list: &[Notification]) -> Vec<Notification> {
        let newly: Vec<Notification> = match self.cursor {
            None => Vec::new(),
            Some(cursor) => list
                .iter()
                .filter(|n| !n.read && n.id > cursor)
                .cloned()
                .collect(),
        };

        if let Some(max_id) = list.iter().map(|n| n.id).max() {
            self.cursor = Some(self.cursor.map_or(max_id, |c| c.max(max_id)));
        }

        newly
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Unread count for the badge: the server-provided count when the
    /// response shape carries one, otherwise derived from the list.
    #[allow(clippy::cast_possible_truncation)]
    pub fn unread_count(payload: &NotificationsPayload) -> u64 {
        payload
            .unread_count()
            .unwrap_or_else(|| payload.list().iter().filter(|n| !n.read).count() as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use netwatch_api::models::Severity;
    use pretty_assertions::assert_eq;

    use super::*;

    fn notif(id: u64, read: bool) -> Notification {
        Notification {
            id,
            title: format!("notification {id}"),
            message: "message".into(),
            severity: Severity::Info,
            read,
            time: "12:00:00".into(),
        }
    }

    #[test]
    fn first_poll_surfaces_nothing_and_initializes_cursor() {
        let mut feed = NotificationFeed::new();

        let newly = feed.reconcile(&[notif(5, false), notif(4, false), notif(3, true)]);

        assert!(newly.is_empty());
        assert_eq!(feed.cursor(), Some(5));
    }

    #[test]
    fn empty_first_poll_keeps_sentinel() {
        let mut feed = NotificationFeed::new();

        assert!(feed.reconcile(&[]).is_empty());
        assert_eq!(feed.cursor(), None);

        // The next non-empty poll is still treated as history.
        assert!(feed.reconcile(&[notif(9, false)]).is_empty());
        assert_eq!(feed.cursor(), Some(9));
    }

    #[test]
    fn new_unread_id_surfaces_once() {
        let mut feed = NotificationFeed::new();
        feed.reconcile(&[notif(5, false)]);

        let newly = feed.reconcile(&[notif(6, false), notif(5, false)]);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, 6);
        assert_eq!(feed.cursor(), Some(6));
    }

    #[test]
    fn reconcile_is_idempotent_for_unchanged_lists() {
        let mut feed = NotificationFeed::new();
        let list = [notif(8, false), notif(7, false)];

        feed.reconcile(&list);
        assert!(feed.reconcile(&list).is_empty());
        assert!(feed.reconcile(&list).is_empty());
    }

    #[test]
    fn read_entries_above_cursor_are_not_surfaced() {
        let mut feed = NotificationFeed::new();
        feed.reconcile(&[notif(3, false)]);

        let newly = feed.reconcile(&[notif(5, true), notif(4, false)]);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, 4);
    }

    #[test]
    fn cursor_never_decreases_on_shorter_lists() {
        let mut feed = NotificationFeed::new();
        feed.reconcile(&[notif(10, false)]);

        // Pagination hiccup: an older window comes back.
        let newly = feed.reconcile(&[notif(4, false), notif(3, false)]);
        assert!(newly.is_empty());
        assert_eq!(feed.cursor(), Some(10));
    }

    #[test]
    fn unread_count_prefers_server_value() {
        let payload = NotificationsPayload::Feed {
            unread_count: Some(7),
            list: vec![notif(1, false)],
        };
        assert_eq!(NotificationFeed::unread_count(&payload), 7);
    }

    #[test]
    fn unread_count_falls_back_to_derived() {
        let payload = NotificationsPayload::Legacy(vec![
            notif(1, false),
            notif(2, true),
            notif(3, false),
        ]);
        assert_eq!(NotificationFeed::unread_count(&payload), 2);
    }
}
