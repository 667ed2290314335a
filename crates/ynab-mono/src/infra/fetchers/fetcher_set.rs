use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{
    core::Shutdowner,
    domain::{events::Event, fetcher::EventFetcher},
};

const BUFFER_SIZE: usize = 100;

pub trait Source: EventFetcher + Shutdowner {}

impl<T: EventFetcher + Shutdowner> Source for T {}

/// Runs several inbound transports and merges their events into one channel.
#[derive(Default)]
#[non_exhaustive]
pub struct FetcherSet {
    sources: Vec<Box<dyn Source>>,
}

impl FetcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<S: Source + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl EventFetcher for FetcherSet {
    async fn fetch(&self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        if self.is_empty() {
            warn!("no event sources configured");
        }

        for source in &self.sources {
            let mut events = source.fetch().await;
            let tx = tx.clone();
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    if tx.send(event).await.is_err() {
                        info!("receiver dropped");
                        break;
                    }
                }
            });
        }

        rx
    }
}

#[async_trait]
impl Shutdowner for FetcherSet {
    async fn shutdown(&self) -> anyhow::Result<()> {
        let mut first_error = None;
        for source in &self.sources {
            if let Err(e) = source.shutdown().await {
                error!("fetcher shutdown failed: {:#}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::domain::events::TelegramEvent;

    struct Fixed {
        events: usize,
        shutdowns: Arc<AtomicUsize>,
        fail_shutdown: bool,
    }

    #[async_trait]
    impl EventFetcher for Fixed {
        async fn fetch(&self) -> mpsc::Receiver<Event> {
            let (tx, rx) = mpsc::channel(self.events.max(1));
            for n in 0..self.events {
                let event = TelegramEvent::SendHtmlMessage {
                    chat_id: n as i64,
                    text: String::new(),
                    keyboard: None,
                };
                tx.send(event.into()).await.unwrap();
            }
            rx
        }
    }

    #[async_trait]
    impl Shutdowner for Fixed {
        async fn shutdown(&self) -> anyhow::Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            if self.fail_shutdown {
                anyhow::bail!("stuck");
            }
            Ok(())
        }
    }

    fn fixed(events: usize, shutdowns: &Arc<AtomicUsize>, fail_shutdown: bool) -> Fixed {
        Fixed {
            events,
            shutdowns: shutdowns.clone(),
            fail_shutdown,
        }
    }

    #[tokio::test]
    async fn test_merges_all_sources() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let set = FetcherSet::new()
            .with(fixed(2, &shutdowns, false))
            .with(fixed(3, &shutdowns, false));

        let mut rx = set.fetch().await;
        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }

        assert_eq!(set.len(), 2);
        assert_eq!(received, 5);
    }

    #[tokio::test]
    async fn test_shutdown_reaches_every_source() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let set = FetcherSet::new()
            .with(fixed(0, &shutdowns, true))
            .with(fixed(0, &shutdowns, false));

        let result = set.shutdown().await;

        assert!(result.is_err());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 2);
    }
}
