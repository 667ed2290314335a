pub mod consumer;
pub mod dispatcher;

pub use consumer::Consumer;
pub use dispatcher::{DEFAULT_MAX_DEPTH, EventDispatcher};
pub use dispatcher::handlers::{ErrorHandler, TelegramHandler, YnabHandler};
