use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::Event;
use crate::infra::consumer::dispatcher::Dispatch;

/// A bound handler as seen by the dispatcher.
///
/// Returning `Ok(true)` claims the event and stops routing. `Ok(false)` passes
/// it on. `Err` is recorded as a fault and routing continues as if unclaimed.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn handle(&self, event: &Event) -> anyhow::Result<bool>;
}

/// Domain-specific handler logic. It does not hold a [`Dispatch`] itself;
/// [`DomainHandler::bind`] pairs it with one once the dispatcher exists.
#[async_trait]
pub trait DomainHandler: Send + Sync + Sized + 'static {
    fn name(&self) -> &'static str;

    async fn handle(&self, dispatch: &Dispatch, event: &Event) -> anyhow::Result<bool>;

    fn bind(self, dispatch: Dispatch) -> Bound<Self> {
        Bound {
            name: self.name(),
            inner: self,
            dispatch,
        }
    }
}

pub struct Bound<H> {
    name: &'static str,
    inner: H,
    dispatch: Dispatch,
}

#[async_trait]
impl<H: DomainHandler> EventHandler for Bound<H> {
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<bool> {
        self.inner.handle(&self.dispatch, event).await
    }
}

/// Handler invoked once every registered handler declined an event.
#[async_trait]
pub trait FallbackHandler: Send + Sync + 'static {
    async fn handle(&self, dispatch: &Dispatch, unhandled: Unhandled<'_>) -> anyhow::Result<()>;
}

/// Produces a bound handler once the dispatch handle is known.
pub type HandlerFactory = Box<dyn FnOnce(Dispatch) -> Box<dyn EventHandler> + Send>;

pub type FallbackFactory = Box<dyn FnOnce(Dispatch) -> Box<dyn FallbackHandler> + Send>;

#[derive(Debug, Clone, Copy)]
pub struct Unhandled<'a> {
    pub event: &'a Event,
    pub faults: &'a [HandlerFault],
}

#[derive(Debug, Error)]
pub enum HandlerFault {
    #[error("handler '{handler}' failed: {error:#}")]
    Failed {
        handler: String,
        error: anyhow::Error,
    },

    #[error("handler '{handler}' panicked: {message}")]
    Panicked { handler: String, message: String },

    #[error("handler '{handler}' claimed {event} without producing a value")]
    MissingValue {
        handler: String,
        event: &'static str,
    },
}

impl HandlerFault {
    pub fn handler(&self) -> &str {
        match self {
            HandlerFault::Failed { handler, .. }
            | HandlerFault::Panicked { handler, .. }
            | HandlerFault::MissingValue { handler, .. } => handler,
        }
    }
}
