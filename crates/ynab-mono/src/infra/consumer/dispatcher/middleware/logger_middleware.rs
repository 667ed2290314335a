use async_trait::async_trait;
use tracing::{debug, error};

use crate::{domain::events::Event, infra::consumer::dispatcher::traits::EventHandler};

#[non_exhaustive]
pub struct LoggingMiddleware<H> {
    inner: H,
}

impl<H> LoggingMiddleware<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: EventHandler> EventHandler for LoggingMiddleware<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<bool> {
        debug!(handler = self.inner.name(), "offering {}", event.name());
        let res = self.inner.handle(event).await;
        match &res {
            Ok(true) => debug!(handler = self.inner.name(), "claimed {}", event.name()),
            Ok(false) => {}
            Err(e) => error!(handler = self.inner.name(), "{:#}", e),
        }

        res
    }
}
