use std::net::SocketAddr;

use anyhow::Context;
use async_trait::async_trait;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tokio::{
    net::TcpListener,
    sync::{
        Mutex,
        mpsc::{self, error::TrySendError},
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use ynab_mono_sdk::{MonoWebhookResponse, mono::STATEMENT_ITEM_TYPE};

use crate::{
    core::Shutdowner,
    domain::{
        events::{Event, MonoEvent},
        fetcher::EventFetcher,
        reply::Reply,
    },
    infra::Config,
};

const MONO_WEBHOOK_ADDR: &str = "MONO_WEBHOOK_ADDR";
const MONO_WEBHOOK_PATH: &str = "MONO_WEBHOOK_PATH";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PATH: &str = "/webhook";
const BUFFER_SIZE: usize = 100;

/// Receives bank statement webhooks.
///
/// Requests are acknowledged as soon as the event is queued; routing happens
/// afterwards in the consumer.
#[non_exhaustive]
pub struct MonoWebhookListener {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    path: String,
    cancel_token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MonoWebhookListener {
    pub async fn bind(config: &Config) -> anyhow::Result<Self> {
        let addr = config.optional(MONO_WEBHOOK_ADDR).unwrap_or(DEFAULT_ADDR);
        let path = config.optional(MONO_WEBHOOK_PATH).unwrap_or(DEFAULT_PATH);
        Self::bind_to(addr, path).await
    }

    pub async fn bind_to(addr: &str, path: &str) -> anyhow::Result<Self> {
        if !path.starts_with('/') {
            anyhow::bail!("webhook path must start with '/': {path}");
        }

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind webhook listener on {addr}"))?;
        let local_addr = listener.local_addr()?;
        info!("mono webhook listener bound to {}{}", local_addr, path);

        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            path: path.to_string(),
            cancel_token: CancellationToken::new(),
            handle: Mutex::new(None),
        })
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl Shutdowner for MonoWebhookListener {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            handle.await?;
        }
        Ok(())
    }
}

impl Drop for MonoWebhookListener {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[async_trait]
impl EventFetcher for MonoWebhookListener {
    async fn fetch(&self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);

        let Some(listener) = self.listener.lock().await.take() else {
            warn!("mono webhook listener already started");
            return rx;
        };

        let app = Router::new()
            .route(&self.path, get(verify).post(receive))
            .with_state(tx);
        let cancel = self.cancel_token.clone();
        info!("serving mono webhooks on {}{}", self.local_addr, self.path);

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await });
            if let Err(e) = server.await {
                error!("mono webhook server failed: {}", e);
            }
            info!("mono webhook listener stopped");
        });
        *self.handle.lock().await = Some(handle);

        rx
    }
}

/// The bank probes the URL with a GET before accepting it.
async fn verify() -> StatusCode {
    StatusCode::OK
}

async fn receive(
    State(tx): State<mpsc::Sender<Event>>,
    Json(body): Json<MonoWebhookResponse>,
) -> StatusCode {
    if body.kind != STATEMENT_ITEM_TYPE {
        debug!("ignoring webhook of type {}", body.kind);
        return StatusCode::OK;
    }

    let event = MonoEvent::WebhookQueried {
        statement: body.data.into(),
        reply: Reply::new(),
    };
    match tx.try_send(event.into()) {
        Ok(()) => StatusCode::OK,
        Err(TrySendError::Full(_)) => {
            warn!("event channel full, rejecting webhook");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(TrySendError::Closed(_)) => {
            warn!("event channel closed, rejecting webhook");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
