//! Scheduled text reminders: the in-memory store, the periodic checker that
//! drives delivery, and the `/remind` payload parser.

pub mod checker;
pub mod command;
pub mod store;

pub use checker::{DeliveryObserver, ReminderChecker, TracingObserver};
pub use store::{Reminder, ReminderStore};
