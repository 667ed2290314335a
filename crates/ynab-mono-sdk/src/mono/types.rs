use serde::Deserialize;

/// Value of `type` for webhook bodies that carry a new statement item.
pub const STATEMENT_ITEM_TYPE: &str = "StatementItem";

#[derive(Debug, Clone, Deserialize)]
pub struct MonoWebhookResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: MonoWebhookData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonoWebhookData {
    pub account: String,
    pub statement_item: MonoStatementItem,
}

/// A single account movement. Amounts are in minor units of the account
/// currency; `currency_code` is the ISO 4217 numeric code of the operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonoStatementItem {
    pub id: String,
    pub time: i64,
    pub description: String,
    pub mcc: u16,
    #[serde(default)]
    pub original_mcc: Option<u16>,
    #[serde(default)]
    pub hold: bool,
    pub amount: i64,
    pub operation_amount: i64,
    pub currency_code: u16,
    #[serde(default)]
    pub commission_rate: i64,
    #[serde(default)]
    pub cashback_amount: i64,
    pub balance: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub counter_iban: Option<String>,
}
