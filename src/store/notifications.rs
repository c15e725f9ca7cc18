use super::mutate::find;
use super::ReplicaStore;
use crate::model::{Channel, Notification, NotificationStatus};

/// Notifications are produced server-side; the replica only mirrors and
/// filters them.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub status: Option<NotificationStatus>,
    pub channel: Option<Channel>,
}

impl ReplicaStore {
    /// Newest first, stable among equal timestamps.
    pub fn notifications(&self, filter: &NotificationFilter) -> Vec<Notification> {
        let mut out: Vec<Notification> = self
            .snapshot
            .notifications
            .iter()
            .filter(|n| filter.status.map_or(true, |s| n.status == s))
            .filter(|n| filter.channel.map_or(true, |c| n.channel == c))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn notification(&self, id: i64) -> Option<&Notification> {
        find(&self.snapshot.notifications, id)
    }
}
