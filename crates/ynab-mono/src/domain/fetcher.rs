use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::events::Event;

/// An inbound transport producing events for the bus.
#[async_trait]
pub trait EventFetcher: Send + Sync + 'static {
    async fn fetch(&self) -> mpsc::Receiver<Event>;
}
