use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::types::{
    DataEnvelope, ErrorEnvelope, PatchTransaction, PatchTransactionsWrapper, SaveTransaction,
    SaveTransactionResponse, SaveTransactionWrapper, SaveTransactionsResponse,
    YnabTransactionDetail,
};

const YNAB_API_URL: &str = "https://api.ynab.com/v1/";

#[non_exhaustive]
pub struct YnabClient {
    client: Client,
    base_url: String,
    token: String,
    budget_id: String,
}

impl YnabClient {
    #[must_use]
    pub fn new(token: String, budget_id: String) -> Self {
        Self {
            client: Client::new(),
            base_url: YNAB_API_URL.to_string(),
            token,
            budget_id,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub async fn create_transaction(
        &self,
        transaction: &SaveTransaction,
    ) -> Result<YnabTransactionDetail> {
        let url = self.transactions_url()?;
        debug!("creating YNAB transaction in account {}", transaction.account_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&SaveTransactionWrapper { transaction })
            .send()
            .await
            .context("YNAB create transaction request failed")?;

        let saved: SaveTransactionResponse = parse_data(response).await?;
        match saved.transaction {
            Some(detail) => Ok(detail),
            None => Err(anyhow::anyhow!(
                "YNAB rejected duplicate import ids: {:?}",
                saved.duplicate_import_ids
            )),
        }
    }

    pub async fn update_transaction(
        &self,
        patch: &PatchTransaction,
    ) -> Result<YnabTransactionDetail> {
        let url = self.transactions_url()?;
        debug!("patching YNAB transaction {}", patch.id);

        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.token)
            .json(&PatchTransactionsWrapper {
                transactions: std::slice::from_ref(patch),
            })
            .send()
            .await
            .context("YNAB update transaction request failed")?;

        let saved: SaveTransactionsResponse = parse_data(response).await?;
        saved
            .transactions
            .into_iter()
            .find(|t| t.id == patch.id)
            .ok_or_else(|| anyhow::anyhow!("YNAB did not return transaction {}", patch.id))
    }

    fn transactions_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?
            .join(&format!("budgets/{}/transactions", self.budget_id))?;
        Ok(url)
    }
}

async fn parse_data<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => {
                warn!("YNAB API error {}: {}", envelope.error.id, envelope.error.name);
                anyhow::anyhow!(
                    "YNAB API error {} ({}): {}",
                    status,
                    envelope.error.name,
                    envelope.error.detail
                )
            }
            Err(_) => anyhow::anyhow!("YNAB API error {}: {}", status, body),
        });
    }

    let envelope = response
        .json::<DataEnvelope<T>>()
        .await
        .context("failed to parse YNAB response")?;
    Ok(envelope.data)
}
