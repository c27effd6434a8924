use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::ChatId;

/// One scheduled notification. Immutable after creation; delivery is modeled
/// as removal from the store, never as mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Reminder {
    pub chat_id: ChatId,
    pub text: String,
    /// Absolute instant at which the reminder becomes deliverable. Timezone
    /// localization happens at the edges; the store only compares instants.
    pub due_at: DateTime<Utc>,
}

/// Thread-safe holding area for pending reminders; the sole authority on
/// which reminders are due.
///
/// All operations serialize on one lock and none of them await while holding
/// it. Entries never leave by reference: `fetch_due` transfers ownership and
/// `list_all` clones.
#[derive(Debug, Default)]
pub struct ReminderStore {
    pending: Mutex<Vec<Reminder>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reminder. Infallible: no capacity bound and no validation at
    /// this layer (the command parser rejects malformed or past input before
    /// calling this).
    pub fn add(&self, reminder: Reminder) {
        self.lock().push(reminder);
    }

    /// Atomically remove and return every reminder with `due_at <= now`.
    ///
    /// This is a combined read+delete: callers own the returned entries and a
    /// reminder fetched once is never returned again, even if its delivery
    /// subsequently fails. Returns an empty vec when nothing is due.
    pub fn fetch_due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        let mut pending = self.lock();
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(pending.len());
        for reminder in pending.drain(..) {
            if reminder.due_at <= now {
                due.push(reminder);
            } else {
                remaining.push(reminder);
            }
        }
        *pending = remaining;
        due
    }

    /// Remove entries equal to `reminder` on all three fields. Out-of-band
    /// cancellation only; the checker never calls this. A missing match is a
    /// normal no-op.
    pub fn delete(&self, reminder: &Reminder) {
        self.lock().retain(|r| r != reminder);
    }

    /// Cloned snapshot of the pending set.
    pub fn list_all(&self) -> Vec<Reminder> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Reminder>> {
        // A poisoned lock means a panic while holding it; the set of pending
        // reminders stays structurally valid, so keep serving.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rem(chat: i64, text: &str, due_at: DateTime<Utc>) -> Reminder {
        Reminder {
            chat_id: ChatId(chat),
            text: text.to_string(),
            due_at,
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn fetch_due_returns_reminder_exactly_once() {
        let store = ReminderStore::new();
        let due_at = at(2025, 6, 20, 15, 30);
        store.add(rem(1, "X", due_at));

        assert!(store.fetch_due(at(2025, 6, 20, 15, 29)).is_empty());

        let due = store.fetch_due(due_at);
        assert_eq!(due, vec![rem(1, "X", due_at)]);

        assert!(store.fetch_due(at(2025, 6, 20, 16, 0)).is_empty());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn fetch_due_partitions_same_timestamp_batch() {
        let store = ReminderStore::new();
        let t = at(2025, 6, 20, 15, 30);
        store.add(rem(1, "a", t));
        store.add(rem(1, "b", t));
        store.add(rem(1, "c", t + chrono::Duration::minutes(1)));

        let mut due = store.fetch_due(t);
        due.sort_by(|a, b| a.text.cmp(&b.text));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].text, "a");
        assert_eq!(due[1].text, "b");

        let held = store.list_all();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].text, "c");
    }

    #[test]
    fn fetch_due_and_list_all_partition_the_held_set() {
        let store = ReminderStore::new();
        let t = at(2025, 1, 1, 12, 0);
        for i in 0..10 {
            store.add(rem(i, "r", t + chrono::Duration::minutes(i)));
        }

        let before = store.list_all();
        let now = t + chrono::Duration::minutes(4);
        let due = store.fetch_due(now);
        let after = store.list_all();

        assert_eq!(due.len() + after.len(), before.len());
        for r in &due {
            assert!(r.due_at <= now);
            assert!(before.contains(r));
            assert!(!after.contains(r));
        }
        for r in &after {
            assert!(r.due_at > now);
        }
    }

    #[test]
    fn delete_requires_exact_value_equality() {
        let store = ReminderStore::new();
        let t = at(2025, 3, 1, 9, 0);
        store.add(rem(7, "buy flowers", t));

        // Text differs by one character: nothing is removed.
        store.delete(&rem(7, "buy flower", t));
        assert_eq!(store.list_all().len(), 1);

        store.delete(&rem(7, "buy flowers", t));
        assert!(store.list_all().is_empty());

        // Deleting again is a no-op, not an error.
        store.delete(&rem(7, "buy flowers", t));
    }

    #[test]
    fn list_all_returns_a_defensive_copy() {
        let store = ReminderStore::new();
        let t = at(2025, 5, 5, 5, 5);
        store.add(rem(1, "x", t));

        let mut snapshot = store.list_all();
        snapshot.clear();
        assert_eq!(store.list_all().len(), 1);
    }
}
