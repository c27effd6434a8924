use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// Outbound messaging port.
///
/// Telegram is the first implementation; the reminder checker and the morning
/// brief only ever see this trait, so tests can substitute a recording fake
/// and future adapters (Slack/Discord) can slot in behind the same interface.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
