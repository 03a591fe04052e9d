//! Bounded notification history.

use std::collections::VecDeque;

use pawalert_core::NotificationMessage;

/// Number of notifications kept in memory.
pub const MAX_NOTIFICATIONS: usize = 20;

/// Most-recent-first ring of received notifications.
///
/// Pushing beyond capacity evicts the oldest entry. Nothing is persisted
/// and duplicates are kept as delivered.
#[derive(Debug, Clone)]
pub struct NotificationHistory {
    entries: VecDeque<NotificationMessage>,
    capacity: usize,
}

impl NotificationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: NotificationMessage) {
        self.entries.push_front(message);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &NotificationMessage> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<NotificationMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_NOTIFICATIONS)
    }
}
