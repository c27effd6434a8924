use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use crate::domain::ChatId;

/// Chats subscribed to the daily morning brief.
///
/// Same discipline as the reminder store: one lock, no awaits under it, and
/// `snapshot` hands out a copy rather than a reference.
#[derive(Debug, Default)]
pub struct SubscriberStore {
    chats: Mutex<HashSet<ChatId>>,
}

impl SubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the chat was newly subscribed.
    pub fn subscribe(&self, chat_id: ChatId) -> bool {
        self.lock().insert(chat_id)
    }

    /// Returns `true` if the chat was subscribed before the call.
    pub fn unsubscribe(&self, chat_id: ChatId) -> bool {
        self.lock().remove(&chat_id)
    }

    pub fn snapshot(&self) -> Vec<ChatId> {
        self.lock().iter().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<ChatId>> {
        self.chats.lock().unwrap_or_else(|e| e.into_inner())
    }
}
