use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;

use svodka_core::{
    domain::ChatId,
    formatting::format_local,
    reminders::command::{parse_remind, RemindParseError},
};

use crate::router::AppState;

use super::menus;

const HELP_TEXT: &str = "/remind YYYY-MM-DD HH:MM text\n\
    — schedule a reminder (example: /remind 2025-06-20 15:30 Buy flowers)\n\n\
/reminders\n\
    — list your pending reminders\n\n\
/cancel N\n\
    — cancel the N-th reminder from /reminders\n\n\
/subscribe\n\
    — get the daily morning brief (weather + exchange rates)\n\n\
/unsubscribe\n\
    — stop the morning brief";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (cmd, args) = parse_command(msg.text().unwrap_or(""));
    let chat_id = ChatId(msg.chat.id.0);

    match cmd.as_str() {
        "start" | "hello" => {
            bot.send_message(msg.chat.id, "Welcome back!\nWhat would you like to use?")
                .reply_markup(menus::main_keyboard())
                .await?;
        }
        "help" => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
        "remind" => {
            handle_remind(&bot, &msg, chat_id, &args, &state).await?;
        }
        "reminders" => {
            handle_list(&bot, &msg, chat_id, &state).await?;
        }
        "cancel" => {
            handle_cancel(&bot, &msg, chat_id, &args, &state).await?;
        }
        "subscribe" => {
            state.subscribers.subscribe(chat_id);
            let at = state.cfg.brief_time.format("%H:%M");
            bot.send_message(
                msg.chat.id,
                format!(
                    "You are subscribed to the morning brief ({at} {}).",
                    state.cfg.timezone
                ),
            )
            .await?;
        }
        "unsubscribe" => {
            state.subscribers.unsubscribe(chat_id);
            bot.send_message(msg.chat.id, "You are unsubscribed from the morning brief.")
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Unknown command. See /help.")
                .await?;
        }
    }

    Ok(())
}

async fn handle_remind(
    bot: &Bot,
    msg: &Message,
    chat_id: ChatId,
    args: &str,
    state: &AppState,
) -> ResponseResult<()> {
    let reply = match parse_remind(chat_id, args, state.cfg.timezone, Utc::now()) {
        Ok(reminder) => {
            let when = format_local(reminder.due_at, state.cfg.timezone);
            let text = reminder.text.clone();
            state.store.add(reminder);
            format!("Reminder set for {when}:\n«{text}»")
        }
        Err(RemindParseError::Usage) => {
            "Need a date, a time and a text. Example:\n/remind 2025-06-20 15:30 Buy flowers"
                .to_string()
        }
        Err(RemindParseError::BadDateTime) => {
            "Could not parse the date/time. Format: YYYY-MM-DD HH:MM.".to_string()
        }
        Err(RemindParseError::NonexistentLocalTime) => {
            "That time does not exist (clocks skip it). Pick another one.".to_string()
        }
        Err(RemindParseError::InThePast) => {
            "That time has already passed. Pick a time in the future.".to_string()
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_cancel(
    bot: &Bot,
    msg: &Message,
    chat_id: ChatId,
    args: &str,
    state: &AppState,
) -> ResponseResult<()> {
    let Ok(index) = args.trim().parse::<usize>() else {
        bot.send_message(msg.chat.id, "Usage: /cancel N (see /reminders for numbers).")
            .await?;
        return Ok(());
    };

    let mut mine = pending_for_chat(state, chat_id);
    let reply = if index >= 1 && index <= mine.len() {
        let reminder = mine.remove(index - 1);
        state.store.delete(&reminder);
        format!("Cancelled: «{}»", reminder.text)
    } else {
        "No reminder with that number.".to_string()
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

fn pending_for_chat(state: &AppState, chat_id: ChatId) -> Vec<svodka_core::reminders::Reminder> {
    let mut mine: Vec<_> = state
        .store
        .list_all()
        .into_iter()
        .filter(|r| r.chat_id == chat_id)
        .collect();
    mine.sort_by_key(|r| r.due_at);
    mine
}

async fn handle_list(
    bot: &Bot,
    msg: &Message,
    chat_id: ChatId,
    state: &AppState,
) -> ResponseResult<()> {
    let mine = pending_for_chat(state, chat_id);
    if mine.is_empty() {
        bot.send_message(msg.chat.id, "No pending reminders.").await?;
        return Ok(());
    }

    let lines: Vec<String> = mine
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {} — {}",
                i + 1,
                format_local(r.due_at, state.cfg.timezone),
                r.text
            )
        })
        .collect();
    bot.send_message(msg.chat.id, format!("Pending reminders:\n{}", lines.join("\n")))
        .await?;
    Ok(())
}
