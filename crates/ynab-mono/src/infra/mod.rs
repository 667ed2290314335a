pub mod clients;
pub mod config;
pub mod consumer;
pub mod fetchers;
pub mod logging;
pub mod settings;
pub mod signal;

pub use config::Config;
pub use fetchers::{FetcherSet, MonoWebhookListener, TelegramPoller};
pub use logging::LogGuard;
pub use settings::Mappings;
pub use signal::UnixSignalHandler;
