use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::{
    domain::{
        events::{Event, MonoEvent, TelegramEvent, YnabEvent},
        ledger::Ledger,
        models::{NewTransaction, Statement, TransactionDetail, TransactionUpdate},
        reply::Reply,
    },
    infra::{
        consumer::dispatcher::{Dispatch, DomainHandler},
        settings::Mappings,
    },
};

/// Monobank minor units (1/100) to YNAB milliunits (1/1000).
const MILLIUNITS_PER_MINOR_UNIT: i64 = 10;
const IMPORT_ID_PREFIX: &str = "MONO:";
/// YNAB rejects longer import ids.
const IMPORT_ID_MAX_LEN: usize = 36;

/// Records bank statements in the ledger and applies user corrections.
///
/// Ledger failures are returned as errors, so the dispatcher reports them
/// through the fallback instead of this handler notifying on its own.
/// Statements for unmapped accounts are left unclaimed.
#[non_exhaustive]
pub struct YnabHandler {
    ledger: Arc<dyn Ledger>,
    mappings: Arc<Mappings>,
}

impl YnabHandler {
    pub fn new(ledger: Arc<dyn Ledger>, mappings: Arc<Mappings>) -> Self {
        Self { ledger, mappings }
    }

    async fn record_statement(
        &self,
        dispatch: &Dispatch,
        statement: &Statement,
        reply: &Reply<TransactionDetail>,
    ) -> anyhow::Result<bool> {
        let Some(account) = self.mappings.account(&statement.account) else {
            debug!("no YNAB account mapped for {}", statement.account);
            return Ok(false);
        };

        let transaction = new_transaction(&account.ynab_account, statement)?;
        let detail = self
            .ledger
            .create_transaction(transaction)
            .await
            .with_context(|| format!("failed to record statement {}", statement.id))?;
        info!("recorded statement {} as transaction {}", statement.id, detail.id);

        if reply.set(detail.clone()).is_err() {
            warn!("reply for statement {} was already set", statement.id);
        }

        let notified = dispatch
            .submit(
                TelegramEvent::SendStatementMessage {
                    statement: statement.clone(),
                    transaction: detail,
                }
                .into(),
            )
            .await;
        if !notified.claimed {
            warn!("nobody sent a notification for statement {}", statement.id);
        }

        Ok(true)
    }

    async fn update_transaction(
        &self,
        update: &TransactionUpdate,
        reply: &Reply<TransactionDetail>,
    ) -> anyhow::Result<bool> {
        let detail = self
            .ledger
            .update_transaction(update)
            .await
            .with_context(|| format!("failed to update transaction {}", update.transaction_id()))?;
        info!("applied {:?}", update);

        if reply.set(detail).is_err() {
            warn!("reply for {} was already set", update.transaction_id());
        }
        Ok(true)
    }
}

#[async_trait]
impl DomainHandler for YnabHandler {
    fn name(&self) -> &'static str {
        "ynab"
    }

    async fn handle(&self, dispatch: &Dispatch, event: &Event) -> anyhow::Result<bool> {
        match event {
            Event::Mono(MonoEvent::WebhookQueried { statement, reply }) => {
                self.record_statement(dispatch, statement, reply).await
            }
            Event::Ynab(YnabEvent::UpdateTransaction { update, reply }) => {
                self.update_transaction(update, reply).await
            }
            Event::Telegram(_) => Ok(false),
        }
    }
}

pub fn new_transaction(account_id: &str, statement: &Statement) -> anyhow::Result<NewTransaction> {
    let date = DateTime::from_timestamp(statement.time, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid statement time {}", statement.time))?
        .with_timezone(&Local)
        .date_naive();

    let import_id = format!("{IMPORT_ID_PREFIX}{}", statement.id)
        .chars()
        .take(IMPORT_ID_MAX_LEN)
        .collect();

    Ok(NewTransaction {
        account_id: account_id.to_string(),
        date,
        amount: statement.amount * MILLIUNITS_PER_MINOR_UNIT,
        currency: statement.currency,
        payee_name: statement.description.clone(),
        memo: statement.comment.clone().filter(|c| !c.is_empty()),
        import_id,
    })
}
