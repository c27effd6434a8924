//! Telegram update handlers.
//!
//! Each handler is thin glue: it parses the update, calls into
//! `svodka-core` (store, parsers) or the provider ports, and replies.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

mod commands;
mod menus;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.starts_with('/') {
        return commands::handle_command(bot, msg, state).await;
    }

    menus::handle_button(bot, msg, state).await
}
