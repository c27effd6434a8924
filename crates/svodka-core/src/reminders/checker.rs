use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    errors::Error,
    messaging::MessagingPort,
    reminders::store::{Reminder, ReminderStore},
    tasks::TaskHandle,
};

/// Observes the outcome of each reminder delivery attempt.
///
/// Delivery is at-most-once by design: `fetch_due` has already claimed the
/// reminder, so a failed send drops it. Making the policy an injectable
/// collaborator lets tests assert on failures without scraping log output.
pub trait DeliveryObserver: Send + Sync {
    fn delivered(&self, reminder: &Reminder);
    fn failed(&self, reminder: &Reminder, error: &Error);
}

/// Default observer: a log line per outcome, nothing else.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl DeliveryObserver for TracingObserver {
    fn delivered(&self, reminder: &Reminder) {
        tracing::info!(chat_id = reminder.chat_id.0, "reminder delivered");
    }

    fn failed(&self, reminder: &Reminder, error: &Error) {
        tracing::warn!(
            chat_id = reminder.chat_id.0,
            %error,
            "failed to deliver reminder (dropped)"
        );
    }
}

/// Periodic task that drains due reminders from the store and sends them to
/// their chats.
///
/// Fetch-and-claim happens before any send: overlapping ticks can never
/// deliver the same reminder twice, at the cost of losing a reminder whose
/// send fails. One failed or slow send never blocks the rest of the batch's
/// delivery or future ticks; each send runs under `send_timeout`.
pub struct ReminderChecker {
    store: Arc<ReminderStore>,
    messenger: Arc<dyn MessagingPort>,
    observer: Arc<dyn DeliveryObserver>,
    period: Duration,
    send_timeout: Duration,
}

impl ReminderChecker {
    pub fn new(
        store: Arc<ReminderStore>,
        messenger: Arc<dyn MessagingPort>,
        observer: Arc<dyn DeliveryObserver>,
        period: Duration,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            messenger,
            observer,
            period,
            send_timeout,
        }
    }

    /// Spawn the checking loop. The returned handle cancels and awaits the
    /// task on `stop`, so shutdown is deterministic.
    pub fn spawn(self: Arc<Self>) -> TaskHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut tick = interval(self.period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(period_secs = self.period.as_secs(), "reminder checker started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => self.run_tick(Utc::now()).await,
                }
            }
            tracing::info!("reminder checker stopped");
        });
        TaskHandle::new(cancel, handle)
    }

    /// One checker tick at `now`. Public so tests can drive the checker
    /// without the timer.
    pub async fn run_tick(&self, now: DateTime<Utc>) {
        let due = self.store.fetch_due(now);
        for reminder in due {
            let text = format!("⏰ Reminder: {}", reminder.text);
            let send = self.messenger.send_text(reminder.chat_id, &text);
            match timeout(self.send_timeout, send).await {
                Ok(Ok(())) => self.observer.delivered(&reminder),
                Ok(Err(e)) => self.observer.failed(&reminder, &e),
                Err(_) => self.observer.failed(
                    &reminder,
                    &Error::External("reminder send timed out".to_string()),
                ),
            }
        }
    }
}
