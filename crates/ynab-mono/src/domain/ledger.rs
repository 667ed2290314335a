use async_trait::async_trait;

use crate::domain::models::{NewTransaction, TransactionDetail, TransactionUpdate};

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn create_transaction(&self, transaction: NewTransaction)
    -> anyhow::Result<TransactionDetail>;

    async fn update_transaction(&self, update: &TransactionUpdate)
    -> anyhow::Result<TransactionDetail>;
}
