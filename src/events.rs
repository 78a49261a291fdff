use tokio::sync::broadcast;
use tracing::debug;

use crate::config::MAX_EVENT_CAPACITY;

/// Lists that listen for modification notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityList {
    Person,
    Contact,
    Like,
    Profile,
    Conversation,
    AccountDeletion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListModification {
    pub list: EntityList,
    pub content: String,
}

impl ListModification {
    pub fn ok(list: EntityList) -> Self {
        Self { list, content: "OK".into() }
    }

    /// Event name as list views know it, e.g. `personListModification`.
    pub fn name(&self) -> &'static str {
        match self.list {
            EntityList::Person => "personListModification",
            EntityList::Contact => "contactListModification",
            EntityList::Like => "likeListModification",
            EntityList::Profile => "profileListModification",
            EntityList::Conversation => "conversationListModification",
            EntityList::AccountDeletion => "accountDeletionListModification",
        }
    }
}

/// Typed fan-out channel for list refresh notices.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ListModification>,
}

impl EventBus {
    /// `capacity` is clamped to `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListModification> {
        self.tx.subscribe()
    }

    /// Returns how many listeners got the event. Zero listeners is fine.
    pub fn broadcast(&self, event: ListModification) -> usize {
        let name = event.name();
        let delivered = self.tx.send(event).unwrap_or(0);
        debug!(event = name, delivered, "broadcast list modification");
        delivered
    }
}

impl Default for EventBus {
    fn default() -> Self { Self::new(16) }
}
