use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ReplyMarkup},
};

use svodka_core::{
    formatting::{split_in_chunks, SAFE_MESSAGE_LEN},
    ports::CurrencyCode,
};

use crate::router::AppState;

const BTN_CURRENCY: &str = "💱 Currency rates";
const BTN_WEATHER: &str = "🌤 Weather";
const BTN_CURRENCY_ALL: &str = "USD, RUB, EUR";
const BTN_WEATHER_TODAY: &str = "Today's forecast";
const BTN_WEATHER_NOW: &str = "Current weather";

pub fn main_keyboard() -> ReplyMarkup {
    keyboard(vec![vec![
        KeyboardButton::new(BTN_WEATHER),
        KeyboardButton::new(BTN_CURRENCY),
    ]])
}

fn currency_keyboard() -> ReplyMarkup {
    keyboard(vec![
        vec![
            KeyboardButton::new("USD"),
            KeyboardButton::new("RUB"),
            KeyboardButton::new("EUR"),
        ],
        vec![KeyboardButton::new(BTN_CURRENCY_ALL)],
    ])
}

fn weather_keyboard() -> ReplyMarkup {
    keyboard(vec![vec![
        KeyboardButton::new(BTN_WEATHER_TODAY),
        KeyboardButton::new(BTN_WEATHER_NOW),
    ]])
}

fn keyboard(rows: Vec<Vec<KeyboardButton>>) -> ReplyMarkup {
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(true))
}

pub async fn handle_button(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = msg.text().unwrap_or("").trim();

    match text {
        BTN_CURRENCY => {
            bot.send_message(msg.chat.id, "Pick a currency:")
                .reply_markup(currency_keyboard())
                .await?;
        }
        BTN_WEATHER => {
            bot.send_message(msg.chat.id, "Pick a view:")
                .reply_markup(weather_keyboard())
                .await?;
        }
        BTN_CURRENCY_ALL => {
            let mut lines = Vec::new();
            for code in CurrencyCode::ALL {
                lines.push(rate_line(&state, code).await);
            }
            bot.send_message(msg.chat.id, lines.join("\n")).await?;
            back_to_main(&bot, &msg).await?;
        }
        "USD" | "RUB" | "EUR" => {
            if let Ok(code) = text.parse::<CurrencyCode>() {
                bot.send_message(msg.chat.id, rate_line(&state, code).await)
                    .reply_markup(currency_keyboard())
                    .await?;
            }
        }
        BTN_WEATHER_TODAY => {
            let report = match state.weather.today().await {
                Ok(day) => format!(
                    "🌤 Today: {}\n\
                     Morning {:.1}°C · Day {:.1}°C · Evening {:.1}°C\n\
                     Min {:.1}°C · Max {:.1}°C\n\
                     Precipitation chance: {:.0}%",
                    day.description,
                    day.morning_c,
                    day.day_c,
                    day.evening_c,
                    day.min_c,
                    day.max_c,
                    day.precipitation * 100.0,
                ),
                Err(error) => {
                    tracing::warn!(%error, "forecast lookup failed");
                    "Could not fetch the forecast right now, try again later.".to_string()
                }
            };
            send_long(&bot, &msg, &report).await?;
            back_to_main(&bot, &msg).await?;
        }
        BTN_WEATHER_NOW => {
            let report = match state.weather.current().await {
                Ok(w) => format!(
                    "🌡 Now: {}, {:.1}°C (feels like {:.1}°C)\n\
                     Humidity {}% · Wind {:.1} m/s",
                    w.description, w.temp_c, w.feels_like_c, w.humidity, w.wind_speed_ms,
                ),
                Err(error) => {
                    tracing::warn!(%error, "current weather lookup failed");
                    "Could not fetch the weather right now, try again later.".to_string()
                }
            };
            send_long(&bot, &msg, &report).await?;
            back_to_main(&bot, &msg).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "What would you like to use?")
                .reply_markup(main_keyboard())
                .await?;
        }
    }

    Ok(())
}

async fn rate_line(state: &AppState, code: CurrencyCode) -> String {
    match state.currency.official_rate(code).await {
        Ok(rate) => format!("Current {code} rate: {rate:.4} BYN"),
        Err(error) => {
            tracing::warn!(%code, %error, "rate lookup failed");
            format!("Could not fetch the {code} rate right now.")
        }
    }
}

async fn back_to_main(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, "What would you like to use?")
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

async fn send_long(bot: &Bot, msg: &Message, text: &str) -> ResponseResult<()> {
    for chunk in split_in_chunks(text, SAFE_MESSAGE_LEN) {
        bot.send_message(msg.chat.id, chunk).await?;
    }
    Ok(())
}
