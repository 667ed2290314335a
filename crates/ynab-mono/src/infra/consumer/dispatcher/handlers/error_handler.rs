use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::{
    domain::{
        events::{Event, MonoEvent, TelegramEvent, YnabEvent},
        models::format_minor_units,
    },
    infra::{
        consumer::dispatcher::{Dispatch, FallbackHandler, Unhandled, handlers::format},
        settings::Mappings,
    },
};

/// Reports events nobody claimed to the chats they concern.
///
/// Unclaimed chat messages are only logged: reporting them would dispatch
/// another chat message that could end up here again.
#[non_exhaustive]
pub struct ErrorHandler {
    mappings: Arc<Mappings>,
}

impl ErrorHandler {
    pub fn new(mappings: Arc<Mappings>) -> Self {
        Self { mappings }
    }

    fn report(&self, unhandled: &Unhandled<'_>) -> Option<(Vec<i64>, String)> {
        let reason = match unhandled.faults.first() {
            Some(fault) => format!("Internal error: {}", format::escape_html(&fault.to_string())),
            None => "No handler accepted it.".to_string(),
        };

        match unhandled.event {
            Event::Mono(MonoEvent::WebhookQueried { statement, .. }) => {
                let chats = match self.mappings.chats_for(&statement.account) {
                    chats if chats.is_empty() => self.mappings.all_chats(),
                    chats => chats,
                };
                let mapping_hint = if self.mappings.account(&statement.account).is_none() {
                    format!(
                        "\nAccount <code>{}</code> has no YNAB mapping.",
                        format::escape_html(&statement.account)
                    )
                } else {
                    String::new()
                };
                let text = format!(
                    "Could not record <b>{}</b> {} {}.{}\n{}",
                    format::escape_html(&statement.description),
                    format_minor_units(statement.operation_amount),
                    statement.currency,
                    mapping_hint,
                    reason,
                );
                Some((chats, text))
            }
            Event::Telegram(TelegramEvent::CallbackQueryReceived(query)) => {
                let chat_id = query
                    .chat_id
                    .filter(|id| self.mappings.is_known_chat(*id))?;
                Some((vec![chat_id], format!("Could not process the action.\n{reason}")))
            }
            Event::Ynab(YnabEvent::UpdateTransaction { .. }) => None,
            Event::Telegram(
                TelegramEvent::SendHtmlMessage { .. } | TelegramEvent::SendStatementMessage { .. },
            ) => None,
        }
    }
}

#[async_trait]
impl FallbackHandler for ErrorHandler {
    async fn handle(&self, dispatch: &Dispatch, unhandled: Unhandled<'_>) -> anyhow::Result<()> {
        warn!(
            faults = unhandled.faults.len(),
            "unhandled event: {:?}",
            unhandled.event
        );
        for fault in unhandled.faults {
            error!("{}", fault);
        }

        let Some((chats, text)) = self.report(&unhandled) else {
            return Ok(());
        };
        if chats.is_empty() {
            warn!("no chat to report unhandled {} to", unhandled.event.name());
            return Ok(());
        }

        for chat_id in chats {
            dispatch
                .submit(
                    TelegramEvent::SendHtmlMessage {
                        chat_id,
                        text: text.clone(),
                        keyboard: None,
                    }
                    .into(),
                )
                .await;
        }

        Ok(())
    }
}
