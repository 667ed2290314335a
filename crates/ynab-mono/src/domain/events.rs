use crate::domain::{
    models::{CallbackQuery, InlineKeyboard, Statement, TransactionDetail, TransactionUpdate},
    reply::{Reply, ReplySlot},
};

/// Whether claiming an event must also produce a value for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Unit,
    Value,
}

#[derive(Debug, Clone)]
pub enum Event {
    Mono(MonoEvent),
    Ynab(YnabEvent),
    Telegram(TelegramEvent),
}

/// Events raised by the bank.
#[derive(Debug, Clone)]
pub enum MonoEvent {
    WebhookQueried {
        statement: Statement,
        reply: Reply<TransactionDetail>,
    },
}

/// Requests to the budgeting ledger.
#[derive(Debug, Clone)]
pub enum YnabEvent {
    UpdateTransaction {
        update: TransactionUpdate,
        reply: Reply<TransactionDetail>,
    },
}

/// Chat notifications and inbound chat interactions.
#[derive(Debug, Clone)]
pub enum TelegramEvent {
    SendStatementMessage {
        statement: Statement,
        transaction: TransactionDetail,
    },
    CallbackQueryReceived(CallbackQuery),
    SendHtmlMessage {
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Mono(MonoEvent::WebhookQueried { .. }) => "mono.webhook_queried",
            Event::Ynab(YnabEvent::UpdateTransaction { .. }) => "ynab.update_transaction",
            Event::Telegram(TelegramEvent::SendStatementMessage { .. }) => {
                "telegram.send_statement_message"
            }
            Event::Telegram(TelegramEvent::CallbackQueryReceived(_)) => {
                "telegram.callback_query_received"
            }
            Event::Telegram(TelegramEvent::SendHtmlMessage { .. }) => "telegram.send_html_message",
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self.reply_slot() {
            Some(_) => ResultShape::Value,
            None => ResultShape::Unit,
        }
    }

    pub fn reply_slot(&self) -> Option<&dyn ReplySlot> {
        match self {
            Event::Mono(MonoEvent::WebhookQueried { reply, .. }) => Some(reply),
            Event::Ynab(YnabEvent::UpdateTransaction { reply, .. }) => Some(reply),
            Event::Telegram(_) => None,
        }
    }
}

impl From<MonoEvent> for Event {
    fn from(event: MonoEvent) -> Self {
        Event::Mono(event)
    }
}

impl From<YnabEvent> for Event {
    fn from(event: YnabEvent) -> Self {
        Event::Ynab(event)
    }
}

impl From<TelegramEvent> for Event {
    fn from(event: TelegramEvent) -> Self {
        Event::Telegram(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_fixed_per_variant() {
        let update: Event = YnabEvent::UpdateTransaction {
            update: TransactionUpdate::Unapprove {
                transaction_id: "tx".into(),
            },
            reply: Reply::new(),
        }
        .into();
        let message: Event = TelegramEvent::SendHtmlMessage {
            chat_id: 1,
            text: "hi".into(),
            keyboard: None,
        }
        .into();

        assert_eq!(update.shape(), ResultShape::Value);
        assert_eq!(message.shape(), ResultShape::Unit);
        assert_eq!(message.name(), "telegram.send_html_message");
    }
}
