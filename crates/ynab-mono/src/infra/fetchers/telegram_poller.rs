use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use ynab_mono_sdk::{TelegramClient, telegram::Update};

use crate::{
    core::Shutdowner,
    domain::{
        events::{Event, TelegramEvent},
        fetcher::EventFetcher,
    },
};

const BUFFER_SIZE: usize = 100;
const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY_SECS: u64 = 5;

/// Long-polls the Bot API for button taps.
#[non_exhaustive]
pub struct TelegramPoller {
    client: TelegramClient,
    cancel_token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramPoller {
    pub fn new(client: TelegramClient) -> Self {
        Self::with_cancel_token(client, CancellationToken::new())
    }

    pub fn with_cancel_token(client: TelegramClient, cancel_token: CancellationToken) -> Self {
        Self {
            client,
            cancel_token,
            handle: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Shutdowner for TelegramPoller {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            handle.await?;
        }
        Ok(())
    }
}

impl Drop for TelegramPoller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[async_trait]
impl EventFetcher for TelegramPoller {
    async fn fetch(&self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        let client = self.client.clone();
        let cancellation_token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            info!("telegram polling started");
            let mut offset = None;

            loop {
                tokio::select! {
                    biased;

                    _ = cancellation_token.cancelled() => {
                        info!("telegram poller cancelled, stopping...");
                        break
                    }

                    result = client.get_updates(offset, POLL_TIMEOUT_SECS) => {
                        let updates = match result {
                            Ok(updates) => updates,
                            Err(e) => {
                                error!("telegram polling failed: {:#}. retrying in {}s...", e, RETRY_DELAY_SECS);
                                tokio::select! {
                                    _ = cancellation_token.cancelled() => {
                                        info!("telegram poller cancelled during retry, stopping...");
                                        break
                                    }
                                    _ = tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)) => continue,
                                }
                            }
                        };

                        for update in updates {
                            offset = Some(update.update_id + 1);
                            let Some(event) = event_from_update(update) else {
                                continue;
                            };
                            if tx.send(event).await.is_err() {
                                info!("receiver dropped");
                                return;
                            }
                        }
                    }
                }
            }
        });
        *self.handle.lock().await = Some(handle);

        rx
    }
}

fn event_from_update(update: Update) -> Option<Event> {
    match (update.callback_query, update.message) {
        (Some(query), _) => Some(TelegramEvent::CallbackQueryReceived(query.into()).into()),
        (None, Some(message)) => {
            debug!(
                "ignoring message {} in chat {}",
                message.message_id, message.chat.id
            );
            None
        }
        (None, None) => None,
    }
}
