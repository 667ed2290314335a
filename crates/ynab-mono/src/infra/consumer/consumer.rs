use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::{sync::mpsc, time::timeout};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{
    domain::{consumer::EventConsumer, events::Event},
    infra::consumer::dispatcher::EventDispatcher,
};

const BUFFER_SIZE: usize = 30;
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Consumer {
    dispatcher: EventDispatcher,
    submit_timeout: Duration,
}

impl Consumer {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self {
            dispatcher,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_submit_timeout(mut self, submit_timeout: Duration) -> Self {
        self.submit_timeout = submit_timeout;
        self
    }

    /// Submits one inbound event. A submit that outlives the timeout is
    /// abandoned and counts as unhandled.
    async fn submit(&self, event: Event) -> bool {
        let name = event.name();
        match timeout(self.submit_timeout, self.dispatcher.submit(event)).await {
            Ok(outcome) => {
                debug!(claimed = outcome.claimed, "{} done", name);
                outcome.claimed
            }
            Err(_) => {
                warn!("{} timed out after {:?}, treating as unhandled", name, self.submit_timeout);
                false
            }
        }
    }
}

#[async_trait]
impl EventConsumer for Consumer {
    async fn consume(&self, ch: mpsc::Receiver<Event>) {
        ReceiverStream::new(ch)
            .map(|event| self.submit(event))
            .buffer_unordered(BUFFER_SIZE)
            .for_each(|_| async {})
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        domain::events::TelegramEvent,
        infra::consumer::dispatcher::{Dispatch, DomainHandler},
    };

    struct Counter {
        seen: Arc<AtomicUsize>,
        delay: Duration,
    }

    #[async_trait]
    impl DomainHandler for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        async fn handle(&self, _dispatch: &Dispatch, _event: &Event) -> anyhow::Result<bool> {
            tokio::time::sleep(self.delay).await;
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn message(n: i64) -> Event {
        TelegramEvent::SendHtmlMessage {
            chat_id: n,
            text: "x".into(),
            keyboard: None,
        }
        .into()
    }

    #[tokio::test]
    async fn test_consume_submits_every_event() {
        let seen = Arc::new(AtomicUsize::new(0));
        let dispatcher = EventDispatcher::builder()
            .handler(Counter {
                seen: seen.clone(),
                delay: Duration::ZERO,
            })
            .build();
        let consumer = Consumer::new(dispatcher);

        let (tx, rx) = mpsc::channel(8);
        for n in 0..5 {
            tx.send(message(n)).await.unwrap();
        }
        drop(tx);

        consumer.consume(rx).await;

        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_consume_drains_unclaimed_events_until_closed() {
        let consumer = Consumer::new(EventDispatcher::builder().build());

        let (tx, rx) = mpsc::channel(8);
        let producer = tokio::spawn(async move {
            for n in 0..100 {
                tx.send(message(n)).await.unwrap();
            }
        });

        consumer.consume(rx).await;

        producer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_submit_times_out_as_unhandled() {
        let seen = Arc::new(AtomicUsize::new(0));
        let dispatcher = EventDispatcher::builder()
            .handler(Counter {
                seen: seen.clone(),
                delay: Duration::from_secs(120),
            })
            .build();
        let consumer = Consumer::new(dispatcher).with_submit_timeout(Duration::from_secs(1));

        assert!(!consumer.submit(message(1)).await);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
