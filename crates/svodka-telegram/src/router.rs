use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use svodka_core::{
    brief::MorningBrief,
    config::Config,
    messaging::MessagingPort,
    ports::{CurrencyPort, WeatherPort},
    reminders::{ReminderChecker, ReminderStore, TracingObserver},
    subscribers::SubscriberStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<ReminderStore>,
    pub subscribers: Arc<SubscriberStore>,
    pub weather: Arc<dyn WeatherPort>,
    pub currency: Arc<dyn CurrencyPort>,
}

/// Run the long-polling dispatcher. Owns the wiring: builds the bot, wraps it
/// in the messaging port, spawns the reminder checker and the morning brief,
/// and tears both down when dispatch returns.
pub async fn run_polling(
    cfg: Arc<Config>,
    store: Arc<ReminderStore>,
    subscribers: Arc<SubscriberStore>,
    weather: Arc<dyn WeatherPort>,
    currency: Arc<dyn CurrencyPort>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "bot started");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let checker = Arc::new(ReminderChecker::new(
        store.clone(),
        messenger.clone(),
        Arc::new(TracingObserver),
        cfg.reminder_check_period,
        cfg.reminder_send_timeout,
    ));
    let checker_handle = checker.spawn();

    let brief = Arc::new(MorningBrief::new(
        subscribers.clone(),
        weather.clone(),
        currency.clone(),
        messenger.clone(),
        cfg.timezone,
        cfg.brief_time,
        cfg.reminder_send_timeout,
    ));
    let brief_handle = brief.spawn();

    let state = Arc::new(AppState {
        cfg,
        store,
        subscribers,
        weather,
        currency,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    checker_handle.stop().await;
    brief_handle.stop().await;

    Ok(())
}
