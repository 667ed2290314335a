use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    ledger::Ledger,
    models::{InlineKeyboard, NewTransaction, TransactionDetail, TransactionUpdate},
    sender::ChatSender,
};

#[derive(Default)]
pub struct MockLedger {
    pub created: Mutex<Vec<NewTransaction>>,
    pub updates: Mutex<Vec<TransactionUpdate>>,
    failing: AtomicBool,
}

impl MockLedger {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("ledger down");
        }
        Ok(())
    }
}

pub fn detail(id: &str, amount: i64) -> TransactionDetail {
    TransactionDetail {
        id: id.to_string(),
        date: "2024-03-01".into(),
        amount,
        account_name: "Card".into(),
        payee_name: Some("Coffee".into()),
        category_id: None,
        category_name: None,
        memo: None,
        approved: true,
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> anyhow::Result<TransactionDetail> {
        self.check()?;
        let mut created = self.created.lock();
        let detail = detail(&format!("tx-{}", created.len() + 1), transaction.amount);
        created.push(transaction);
        Ok(detail)
    }

    async fn update_transaction(
        &self,
        update: &TransactionUpdate,
    ) -> anyhow::Result<TransactionDetail> {
        self.check()?;
        self.updates.lock().push(update.clone());

        let mut detail = detail(update.transaction_id(), -95000);
        match update {
            TransactionUpdate::Unapprove { .. } => detail.approved = false,
            TransactionUpdate::Uncategorize { .. } => {}
            TransactionUpdate::Categorize { category_id, .. } => {
                detail.category_id = Some(category_id.clone());
                detail.category_name = Some(format!("Category {category_id}"));
            }
        }
        Ok(detail)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<Sent>>,
    pub edited: Mutex<Vec<(i64, i64, String)>>,
    pub answers: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingSender {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("chat unreachable");
        }
        self.sent.lock().push(Sent {
            chat_id,
            text: html.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        html: &str,
        _keyboard: Option<&InlineKeyboard>,
    ) -> anyhow::Result<()> {
        self.edited
            .lock()
            .push((chat_id, message_id, html.to_string()));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        self.answers
            .lock()
            .push((callback_id.to_string(), text.to_string()));
        Ok(())
    }
}
