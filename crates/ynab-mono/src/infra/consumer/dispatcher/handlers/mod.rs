pub mod callback;
pub mod error_handler;
pub mod format;
pub mod telegram_handler;
pub mod ynab_handler;

pub use error_handler::ErrorHandler;
pub use telegram_handler::TelegramHandler;
pub use ynab_handler::YnabHandler;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
pub(crate) mod test_support;
