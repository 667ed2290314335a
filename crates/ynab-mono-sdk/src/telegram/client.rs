use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, GetUpdatesRequest,
    InlineKeyboardMarkup, Message, PARSE_MODE_HTML, SendMessageRequest, Update,
};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

#[non_exhaustive]
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: TELEGRAM_API_URL.to_string(),
            token,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode: PARSE_MODE_HTML,
                reply_markup: keyboard,
            },
        )
        .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.call::<_, serde_json::Value>(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id,
                message_id,
                text,
                parse_mode: PARSE_MODE_HTML,
                reply_markup: keyboard,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: &str) -> Result<()> {
        self.call::<_, bool>(
            "answerCallbackQuery",
            &AnswerCallbackQueryRequest {
                callback_query_id,
                text,
            },
        )
        .await?;
        Ok(())
    }

    /// Long-polls for updates. `offset` is one past the last seen `update_id`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: timeout_secs,
                allowed_updates: ALLOWED_UPDATES,
            },
        )
        .await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        debug!("telegram call {}", method);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?
            .json::<ApiResponse<T>>()
            .await
            .with_context(|| format!("failed to parse telegram {method} response"))?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(anyhow::anyhow!(
                "telegram {} failed: {}",
                method,
                response.description.unwrap_or_default()
            )),
        }
    }
}
