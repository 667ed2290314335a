pub mod dispatcher;
pub mod handlers;
pub mod middleware;
pub mod traits;

pub use dispatcher::{DEFAULT_MAX_DEPTH, Dispatch, EventDispatcher};
pub use traits::{DomainHandler, FallbackHandler, Unhandled};
