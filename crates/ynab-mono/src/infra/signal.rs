use async_trait::async_trait;
use tokio::signal::unix::{SignalKind, signal};
use tracing::warn;

use crate::domain::{ShutdownKind, SignalHandler};

#[derive(Default)]
pub struct UnixSignalHandler;

impl UnixSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalHandler for UnixSignalHandler {
    async fn wait_for_shutdown(&self) -> ShutdownKind {
        let streams = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        );

        let (Ok(mut sigterm), Ok(mut sigint), Ok(mut sighup)) = streams else {
            warn!("failed to register unix signal handlers, waiting for ctrl-c");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {}", e);
            }
            return ShutdownKind::Interrupt;
        };

        tokio::select! {
            _ = sigterm.recv() => ShutdownKind::Terminate,
            _ = sigint.recv() => ShutdownKind::Interrupt,
            _ = sighup.recv() => ShutdownKind::Hangup,
        }
    }
}
