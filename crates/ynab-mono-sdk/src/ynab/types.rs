use serde::{Deserialize, Serialize};

pub const CLEARED: &str = "cleared";
pub const UNCLEARED: &str = "uncleared";

/// Body of a transaction create request. `amount` is in milliunits.
#[derive(Debug, Clone, Serialize)]
pub struct SaveTransaction {
    pub account_id: String,
    pub date: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub cleared: String,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
}

/// Partial update. `category_id: Some(None)` is sent as an explicit `null`
/// which clears the category.
#[derive(Debug, Clone, Serialize)]
pub struct PatchTransaction {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YnabTransactionDetail {
    pub id: String,
    pub date: String,
    pub amount: i64,
    #[serde(default)]
    pub memo: Option<String>,
    pub cleared: String,
    pub approved: bool,
    pub account_id: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub payee_id: Option<String>,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveTransactionWrapper<'a> {
    pub transaction: &'a SaveTransaction,
}

#[derive(Debug, Serialize)]
pub(crate) struct PatchTransactionsWrapper<'a> {
    pub transactions: &'a [PatchTransaction],
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveTransactionResponse {
    #[serde(default)]
    pub transaction: Option<YnabTransactionDetail>,
    #[serde(default)]
    pub duplicate_import_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveTransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<YnabTransactionDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serializes_explicit_null_category() {
        let patch = PatchTransaction {
            id: "t1".into(),
            approved: None,
            category_id: Some(None),
        };
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json, serde_json::json!({ "id": "t1", "category_id": null }));
    }

    #[test]
    fn test_patch_omits_untouched_fields() {
        let patch = PatchTransaction {
            id: "t1".into(),
            approved: Some(false),
            category_id: None,
        };
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json, serde_json::json!({ "id": "t1", "approved": false }));
    }
}
