//! Chain-of-responsibility event bus.
//!
//! Handlers are offered an event in registration order and the first one to
//! claim it ends routing. When nobody claims it the fallback runs once.
//! Handlers re-enter the bus through their [`Dispatch`] handle; nested
//! dispatch resolves completely before the outer handler resumes.
//!
//! Cyclic handler logic is the handler author's bug. The bus only refuses
//! nesting deeper than the configured maximum.

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    domain::{
        events::{Event, ResultShape},
        reply::Reply,
    },
    infra::consumer::dispatcher::{
        middleware::LoggingMiddleware,
        traits::{
            DomainHandler, EventHandler, FallbackFactory, FallbackHandler, HandlerFactory,
            HandlerFault, Unhandled,
        },
    },
};

pub const DEFAULT_MAX_DEPTH: usize = 16;

tokio::task_local! {
    static DISPATCH_DEPTH: usize;
}

/// Result of routing one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T = ()> {
    pub claimed: bool,
    pub value: Option<T>,
}

impl<T> Outcome<T> {
    pub fn unclaimed() -> Self {
        Self {
            claimed: false,
            value: None,
        }
    }
}

impl Outcome {
    fn claimed() -> Self {
        Self {
            claimed: true,
            value: None,
        }
    }
}

struct Router {
    handlers: Vec<Box<dyn EventHandler>>,
    fallback: Box<dyn FallbackHandler>,
    dispatch: Dispatch,
    max_depth: usize,
}

/// Re-entry handle into the bus, shared by every handler.
///
/// Holds a weak reference so handlers never keep the dispatcher alive; once
/// the dispatcher is gone every submit comes back unclaimed.
#[derive(Clone)]
pub struct Dispatch {
    router: Weak<Router>,
}

impl Dispatch {
    pub async fn submit(&self, event: Event) -> Outcome {
        match self.router.upgrade() {
            Some(router) => router.submit(event).await,
            None => {
                warn!("dispatcher dropped, {} not delivered", event.name());
                Outcome::unclaimed()
            }
        }
    }

    /// Submits a value-producing event built around a fresh reply slot and
    /// returns the produced value if the event was claimed.
    pub async fn request<T, F>(&self, build: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce(Reply<T>) -> Event,
    {
        let reply = Reply::new();
        let outcome = self.submit(build(reply.clone())).await;
        let value = if outcome.claimed { reply.take() } else { None };

        Outcome {
            claimed: outcome.claimed,
            value,
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("alive", &(self.router.strong_count() > 0))
            .finish()
    }
}

#[derive(Clone)]
pub struct EventDispatcher {
    router: Arc<Router>,
}

impl EventDispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    #[cfg(test)]
    pub fn dispatch(&self) -> Dispatch {
        self.router.dispatch.clone()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.router.handlers.iter().map(|h| h.name()).collect()
    }

    pub async fn submit(&self, event: Event) -> Outcome {
        self.router.submit(event).await
    }

    #[cfg(test)]
    pub async fn request<T, F>(&self, build: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce(Reply<T>) -> Event,
    {
        self.router.dispatch.request(build).await
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handler_names())
            .field("max_depth", &self.router.max_depth)
            .finish()
    }
}

impl Router {
    async fn submit(&self, event: Event) -> Outcome {
        let depth = DISPATCH_DEPTH.try_with(|d| *d).unwrap_or(0) + 1;
        if depth > self.max_depth {
            error!(
                depth,
                max_depth = self.max_depth,
                "refusing {}: dispatch nested too deep",
                event.name()
            );
            return Outcome::unclaimed();
        }

        let span = info_span!("dispatch", event = event.name(), depth);
        DISPATCH_DEPTH
            .scope(depth, self.route(event))
            .instrument(span)
            .await
    }

    async fn route(&self, event: Event) -> Outcome {
        let mut faults = Vec::new();

        for handler in &self.handlers {
            let result = AssertUnwindSafe(handler.handle(&event))
                .catch_unwind()
                .await;

            let fault = match result {
                Ok(Ok(true)) => {
                    if has_required_value(&event) {
                        return Outcome::claimed();
                    }
                    HandlerFault::MissingValue {
                        handler: handler.name().to_string(),
                        event: event.name(),
                    }
                }
                Ok(Ok(false)) => {
                    discard_stray_value(handler.name(), &event);
                    continue;
                }
                Ok(Err(error)) => HandlerFault::Failed {
                    handler: handler.name().to_string(),
                    error,
                },
                Err(panic) => HandlerFault::Panicked {
                    handler: handler.name().to_string(),
                    message: panic_message(panic.as_ref()),
                },
            };

            discard_stray_value(handler.name(), &event);
            warn!(handler = fault.handler(), "{}", fault);
            faults.push(fault);
        }

        debug!("no handler claimed {}, running fallback", event.name());
        let unhandled = Unhandled {
            event: &event,
            faults: &faults,
        };
        let result = AssertUnwindSafe(self.fallback.handle(&self.dispatch, unhandled))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("fallback failed for {}: {:#}", event.name(), e),
            Err(panic) => error!(
                "fallback panicked for {}: {}",
                event.name(),
                panic_message(panic.as_ref())
            ),
        }

        Outcome::unclaimed()
    }
}

fn has_required_value(event: &Event) -> bool {
    match event.shape() {
        ResultShape::Unit => true,
        ResultShape::Value => event.reply_slot().is_some_and(|slot| slot.is_set()),
    }
}

fn discard_stray_value(handler: &str, event: &Event) {
    if event.reply_slot().is_some_and(|slot| slot.discard()) {
        warn!(
            handler,
            "discarded value produced for unclaimed {}",
            event.name()
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fallback used when none is configured: logs and drops the event.
struct LogOnlyFallback;

#[async_trait]
impl FallbackHandler for LogOnlyFallback {
    async fn handle(&self, _dispatch: &Dispatch, unhandled: Unhandled<'_>) -> anyhow::Result<()> {
        warn!(
            faults = unhandled.faults.len(),
            "unhandled event {}",
            unhandled.event.name()
        );
        Ok(())
    }
}

/// Collects handler factories in priority order.
///
/// Registration order is the only priority: a handler registered first sees
/// every event before the ones after it. The fallback is kept apart from the
/// list so it can never shadow a real handler.
#[must_use]
pub struct DispatcherBuilder {
    factories: Vec<HandlerFactory>,
    fallback: Option<FallbackFactory>,
    max_depth: usize,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            fallback: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn handler<H: DomainHandler>(self, handler: H) -> Self {
        self.handler_with(move |dispatch| -> Box<dyn EventHandler> {
            Box::new(LoggingMiddleware::new(handler.bind(dispatch)))
        })
    }

    pub fn handler_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(Dispatch) -> Box<dyn EventHandler> + Send + 'static,
    {
        self.factories.push(Box::new(factory));
        self
    }

    pub fn fallback<H: FallbackHandler>(self, handler: H) -> Self {
        self.fallback_with(move |_| -> Box<dyn FallbackHandler> { Box::new(handler) })
    }

    pub fn fallback_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(Dispatch) -> Box<dyn FallbackHandler> + Send + 'static,
    {
        self.fallback = Some(Box::new(factory));
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn build(self) -> EventDispatcher {
        let Self {
            factories,
            fallback,
            max_depth,
        } = self;
        let fallback = fallback.unwrap_or_else(|| {
            Box::new(|_| -> Box<dyn FallbackHandler> { Box::new(LogOnlyFallback) })
        });

        let router = Arc::new_cyclic(|weak: &Weak<Router>| {
            let dispatch = Dispatch {
                router: weak.clone(),
            };
            let handlers = factories
                .into_iter()
                .map(|factory| factory(dispatch.clone()))
                .collect();
            let fallback = fallback(dispatch.clone());

            Router {
                handlers,
                fallback,
                dispatch,
                max_depth,
            }
        });

        let dispatcher = EventDispatcher { router };
        info!(handlers = ?dispatcher.handler_names(), "event dispatcher built");
        dispatcher
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
