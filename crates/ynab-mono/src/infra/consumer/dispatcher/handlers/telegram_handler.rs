use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        events::{Event, TelegramEvent, YnabEvent},
        models::{CallbackQuery, InlineKeyboard, Statement, TransactionDetail},
        sender::ChatSender,
    },
    infra::{
        consumer::dispatcher::{
            Dispatch, DomainHandler,
            handlers::{callback::CallbackData, format},
        },
        settings::Mappings,
    },
};

const PENDING_CAPACITY: usize = 256;

const ANSWER_DONE: &str = "Done";
const ANSWER_FAILED: &str = "Failed to update the transaction";
const ANSWER_UNRECOGNIZED: &str = "Unrecognized action";

/// Sends chat notifications and turns inline button taps into ledger updates.
///
/// Send failures are logged and the event still counts as claimed: there is
/// no other handler that could deliver the message.
#[non_exhaustive]
pub struct TelegramHandler {
    sender: Arc<dyn ChatSender>,
    mappings: Arc<Mappings>,
    pending: Mutex<PendingStatements>,
}

impl TelegramHandler {
    pub fn new(sender: Arc<dyn ChatSender>, mappings: Arc<Mappings>) -> Self {
        Self {
            sender,
            mappings,
            pending: Mutex::new(PendingStatements::new(PENDING_CAPACITY)),
        }
    }

    async fn send_statement(
        &self,
        statement: &Statement,
        transaction: &TransactionDetail,
    ) -> anyhow::Result<bool> {
        let chats = self.mappings.chats_for(&statement.account);
        if chats.is_empty() {
            debug!("no chat mapped for account {}", statement.account);
            return Ok(false);
        }

        self.pending
            .lock()
            .await
            .insert(transaction.id.clone(), statement.clone());

        let text = format::statement_message(statement, transaction);
        let keyboard = format::transaction_keyboard(&transaction.id, &self.mappings);
        for chat_id in chats {
            self.send(chat_id, &text, Some(&keyboard)).await;
        }

        Ok(true)
    }

    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) {
        if let Err(e) = self.sender.send(chat_id, text, keyboard).await {
            error!("failed to send message to chat {}: {:#}", chat_id, e);
        }
    }

    async fn on_callback(&self, dispatch: &Dispatch, query: &CallbackQuery) -> anyhow::Result<bool> {
        let Some(chat_id) = query.chat_id.filter(|id| self.mappings.is_known_chat(*id)) else {
            warn!("callback query {} from unknown chat {:?}", query.id, query.chat_id);
            return Ok(false);
        };

        let update = query
            .data
            .as_deref()
            .and_then(CallbackData::decode)
            .and_then(|data| data.into_update(&self.mappings));
        let Some(update) = update else {
            info!("unrecognized callback data {:?} from {}", query.data, query.from);
            self.answer(query, ANSWER_UNRECOGNIZED).await;
            return Ok(true);
        };

        let transaction_id = update.transaction_id().to_string();
        let outcome = dispatch
            .request(|reply| YnabEvent::UpdateTransaction { update, reply }.into())
            .await;

        let Some(detail) = outcome.value else {
            self.answer(query, ANSWER_FAILED).await;
            return Ok(true);
        };

        if let Some(message_id) = query.message_id {
            let statement = self.pending.lock().await.get(&transaction_id).cloned();
            let text = match &statement {
                Some(statement) => format::statement_message(statement, &detail),
                None => format::transaction_message(&detail),
            };
            let keyboard = format::transaction_keyboard(&detail.id, &self.mappings);

            if let Err(e) = self
                .sender
                .edit(chat_id, message_id, &text, Some(&keyboard))
                .await
            {
                error!("failed to edit message {} in chat {}: {:#}", message_id, chat_id, e);
            }
        }

        self.answer(query, ANSWER_DONE).await;
        Ok(true)
    }

    async fn answer(&self, query: &CallbackQuery, text: &str) {
        if let Err(e) = self.sender.answer_callback(&query.id, text).await {
            warn!("failed to answer callback query {}: {:#}", query.id, e);
        }
    }
}

#[async_trait]
impl DomainHandler for TelegramHandler {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn handle(&self, dispatch: &Dispatch, event: &Event) -> anyhow::Result<bool> {
        match event {
            Event::Telegram(TelegramEvent::SendStatementMessage {
                statement,
                transaction,
            }) => self.send_statement(statement, transaction).await,
            Event::Telegram(TelegramEvent::SendHtmlMessage {
                chat_id,
                text,
                keyboard,
            }) => {
                self.send(*chat_id, text, keyboard.as_ref()).await;
                Ok(true)
            }
            Event::Telegram(TelegramEvent::CallbackQueryReceived(query)) => {
                self.on_callback(dispatch, query).await
            }
            Event::Mono(_) | Event::Ynab(_) => Ok(false),
        }
    }
}

/// Statements behind recently sent messages, oldest evicted first.
struct PendingStatements {
    capacity: usize,
    order: VecDeque<String>,
    statements: HashMap<String, Statement>,
}

impl PendingStatements {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            statements: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, transaction_id: String, statement: Statement) {
        if self
            .statements
            .insert(transaction_id.clone(), statement)
            .is_some()
        {
            return;
        }

        self.order.push_back(transaction_id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.statements.remove(&oldest);
            }
        }
    }

    fn get(&self, transaction_id: &str) -> Option<&Statement> {
        self.statements.get(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Currency;

    fn statement(id: &str) -> Statement {
        Statement {
            account: "mono".into(),
            id: id.into(),
            time: 0,
            description: "d".into(),
            mcc: 0,
            amount: 0,
            operation_amount: 0,
            currency: Currency::UAH,
            balance: 0,
            comment: None,
            hold: false,
        }
    }

    #[test]
    fn test_pending_evicts_oldest() {
        let mut pending = PendingStatements::new(2);
        pending.insert("a".into(), statement("1"));
        pending.insert("b".into(), statement("2"));
        pending.insert("c".into(), statement("3"));

        assert!(pending.get("a").is_none());
        assert_eq!(pending.get("b").map(|s| s.id.as_str()), Some("2"));
        assert_eq!(pending.get("c").map(|s| s.id.as_str()), Some("3"));
    }

    #[test]
    fn test_pending_reinsert_does_not_duplicate_order() {
        let mut pending = PendingStatements::new(2);
        pending.insert("a".into(), statement("1"));
        pending.insert("a".into(), statement("1b"));
        pending.insert("b".into(), statement("2"));

        assert_eq!(pending.get("a").map(|s| s.id.as_str()), Some("1b"));
        assert_eq!(pending.order.len(), 2);
    }
}
