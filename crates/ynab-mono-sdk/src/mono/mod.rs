pub mod types;

pub use types::{MonoStatementItem, MonoWebhookData, MonoWebhookResponse, STATEMENT_ITEM_TYPE};
