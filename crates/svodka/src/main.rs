use std::sync::Arc;

use svodka_core::{
    config::Config,
    ports::{CurrencyPort, WeatherPort},
    reminders::ReminderStore,
    subscribers::SubscriberStore,
};
use svodka_providers::{NbrbCurrencyClient, OpenWeatherClient};

#[tokio::main]
async fn main() -> Result<(), svodka_core::Error> {
    svodka_core::logging::init("svodka")?;

    let cfg = Arc::new(Config::load()?);

    let store = Arc::new(ReminderStore::new());
    let subscribers = Arc::new(SubscriberStore::new());

    let weather: Arc<dyn WeatherPort> = Arc::new(OpenWeatherClient::new(
        cfg.openweather_api_key.clone(),
        cfg.weather_lat.clone(),
        cfg.weather_lon.clone(),
    )?);
    let currency: Arc<dyn CurrencyPort> = Arc::new(NbrbCurrencyClient::new()?);

    svodka_telegram::router::run_polling(cfg, store, subscribers, weather, currency)
        .await
        .map_err(|e| svodka_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
