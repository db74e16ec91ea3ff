//! crates/retro_editor_core/src/notifications.rs
//!
//! The ordered, auto-expiring queue of toast notifications.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Notification, NotificationId, NotificationKind};

/// How long a toast stays visible unless configured otherwise.
pub const DEFAULT_NOTIFICATION_TTL_MS: i64 = 3000;

/// Notifications in insertion order. Entries expire `ttl` after creation and
/// are pruned whenever the queue is read or written.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    ttl: Duration,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
        }
    }

    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> NotificationId {
        self.prune(now);
        let notification = Notification {
            id: NotificationId::new(),
            kind,
            message: message.into(),
            created_at: now,
        };
        let id = notification.id;
        self.entries.push(notification);
        id
    }

    /// Drops every entry whose display time has elapsed. `retain` keeps the
    /// relative order of the survivors.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|n| now < n.created_at + ttl);
    }

    /// The live notifications at `now`, oldest first.
    pub fn active(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.prune(now);
        self.entries.clone()
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_NOTIFICATION_TTL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn notification_expires_after_ttl() {
        let mut queue = NotificationQueue::default();
        queue.push(NotificationKind::Success, "saved", t0());

        assert_eq!(queue.active(t0() + Duration::milliseconds(2900)).len(), 1);
        assert!(queue.active(t0() + Duration::milliseconds(3100)).is_empty());
    }

    #[test]
    fn expiry_keeps_order_of_remaining_entries() {
        let mut queue = NotificationQueue::default();
        queue.push(NotificationKind::Info, "first", t0());
        queue.push(NotificationKind::Info, "second", t0() + Duration::seconds(1));
        queue.push(NotificationKind::Error, "third", t0() + Duration::seconds(2));

        let live = queue.active(t0() + Duration::milliseconds(3500));
        let messages: Vec<_> = live.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn dismiss_removes_only_the_given_entry() {
        let mut queue = NotificationQueue::default();
        queue.push(NotificationKind::Info, "a", t0());
        let b = queue.push(NotificationKind::Info, "b", t0());
        queue.push(NotificationKind::Info, "c", t0());

        assert!(queue.dismiss(b));
        assert!(!queue.dismiss(b));
        let messages: Vec<_> = queue.active(t0()).into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["a", "c"]);
    }
}
