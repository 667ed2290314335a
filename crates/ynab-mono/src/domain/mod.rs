pub mod consumer;
pub mod events;
pub mod fetcher;
pub mod ledger;
pub mod models;
pub mod reply;
pub mod sender;
pub mod signal;

pub use signal::{ShutdownKind, SignalHandler};
