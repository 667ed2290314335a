//! Adapters between the SDK clients and the domain seams.

use async_trait::async_trait;
use ynab_mono_sdk::{
    MonoWebhookData, TelegramClient, YnabClient,
    telegram::{self, InlineKeyboardButton, InlineKeyboardMarkup},
    ynab::{PatchTransaction, SaveTransaction, YnabTransactionDetail, types::CLEARED},
};

use crate::domain::{
    ledger::Ledger,
    models::{
        CallbackQuery, Currency, InlineKeyboard, NewTransaction, Statement, TransactionDetail,
        TransactionUpdate,
    },
    sender::ChatSender,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[async_trait]
impl Ledger for YnabClient {
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> anyhow::Result<TransactionDetail> {
        let request = SaveTransaction {
            account_id: transaction.account_id,
            date: transaction.date.format(DATE_FORMAT).to_string(),
            amount: transaction.amount,
            payee_name: Some(transaction.payee_name),
            category_id: None,
            memo: transaction.memo,
            cleared: CLEARED.to_string(),
            approved: true,
            import_id: Some(transaction.import_id),
        };

        Ok(YnabClient::create_transaction(self, &request).await?.into())
    }

    async fn update_transaction(
        &self,
        update: &TransactionUpdate,
    ) -> anyhow::Result<TransactionDetail> {
        Ok(YnabClient::update_transaction(self, &update.into()).await?.into())
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    async fn send(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()> {
        let markup = keyboard.map(InlineKeyboardMarkup::from);
        self.send_message(chat_id, html, markup.as_ref()).await?;
        Ok(())
    }

    async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()> {
        let markup = keyboard.map(InlineKeyboardMarkup::from);
        self.edit_message_text(chat_id, message_id, html, markup.as_ref())
            .await
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        self.answer_callback_query(callback_id, text).await
    }
}

impl From<MonoWebhookData> for Statement {
    fn from(data: MonoWebhookData) -> Self {
        let item = data.statement_item;
        Statement {
            account: data.account,
            id: item.id,
            time: item.time,
            description: item.description,
            mcc: item.mcc,
            amount: item.amount,
            operation_amount: item.operation_amount,
            currency: Currency(item.currency_code),
            balance: item.balance,
            comment: item.comment,
            hold: item.hold,
        }
    }
}

impl From<YnabTransactionDetail> for TransactionDetail {
    fn from(t: YnabTransactionDetail) -> Self {
        TransactionDetail {
            id: t.id,
            date: t.date,
            amount: t.amount,
            account_name: t.account_name,
            payee_name: t.payee_name,
            category_id: t.category_id,
            category_name: t.category_name,
            memo: t.memo,
            approved: t.approved,
        }
    }
}

impl From<&TransactionUpdate> for PatchTransaction {
    fn from(update: &TransactionUpdate) -> Self {
        let id = update.transaction_id().to_string();
        match update {
            TransactionUpdate::Unapprove { .. } => PatchTransaction {
                id,
                approved: Some(false),
                category_id: None,
            },
            TransactionUpdate::Uncategorize { .. } => PatchTransaction {
                id,
                approved: None,
                category_id: Some(None),
            },
            TransactionUpdate::Categorize { category_id, .. } => PatchTransaction {
                id,
                approved: Some(true),
                category_id: Some(Some(category_id.clone())),
            },
        }
    }
}

impl From<&InlineKeyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &InlineKeyboard) -> Self {
        InlineKeyboardMarkup {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.text.clone(),
                            callback_data: b.data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl From<telegram::CallbackQuery> for CallbackQuery {
    fn from(q: telegram::CallbackQuery) -> Self {
        let from = q
            .from
            .username
            .unwrap_or_else(|| q.from.first_name.clone());
        CallbackQuery {
            id: q.id,
            from,
            chat_id: q.message.as_ref().map(|m| m.chat.id),
            message_id: q.message.as_ref().map(|m| m.message_id),
            data: q.data,
        }
    }
}
