use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::events::Event;

/// Drains inbound events into the bus.
#[async_trait]
pub trait EventConsumer: Send + Sync + 'static {
    async fn consume(&self, ch: mpsc::Receiver<Event>);
}
