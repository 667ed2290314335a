pub mod mono;
pub mod telegram;
pub mod ynab;

pub use mono::{MonoStatementItem, MonoWebhookData, MonoWebhookResponse};
pub use telegram::TelegramClient;
pub use ynab::YnabClient;
