//! Core domain + application logic for the svodka assistant bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the external
//! data providers (exchange rates, weather) live behind ports (traits)
//! implemented in adapter crates.

pub mod brief;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod reminders;
pub mod subscribers;
pub mod tasks;

pub use errors::{Error, Result};
