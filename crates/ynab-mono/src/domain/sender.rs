use async_trait::async_trait;

use crate::domain::models::InlineKeyboard;

/// Outbound side of the chat bot. Messages are HTML formatted.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()>;

    async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()>;
}
