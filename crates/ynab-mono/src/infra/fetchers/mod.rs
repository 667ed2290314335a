pub mod fetcher_set;
pub mod mono_webhook;
pub mod telegram_poller;

pub use fetcher_set::FetcherSet;
pub use mono_webhook::MonoWebhookListener;
pub use telegram_poller::TelegramPoller;
