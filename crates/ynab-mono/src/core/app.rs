use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::{
    core::Shutdowner,
    domain::{SignalHandler, consumer::EventConsumer, fetcher::EventFetcher},
    infra::LogGuard,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Wires the inbound transports to the consumer and runs until a signal.
pub struct App<S, F, C> {
    _log_guard: Option<LogGuard>,
    signal_handler: S,
    fetcher: F,
    consumer: C,
    shutdown_timeout: Duration,
}

impl<S, F, C> App<S, F, C>
where
    S: SignalHandler,
    F: EventFetcher + Shutdowner,
    C: EventConsumer,
{
    pub fn new(signal_handler: S, fetcher: F, consumer: C) -> Self {
        Self {
            _log_guard: None,
            signal_handler,
            fetcher,
            consumer,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        }
    }

    /// Keeps the log writer alive until the app finishes draining.
    #[must_use]
    pub fn with_log_guard(mut self, log_guard: LogGuard) -> Self {
        self._log_guard = Some(log_guard);
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!("ynab-mono running...");

        let Self {
            _log_guard,
            signal_handler,
            fetcher,
            consumer,
            shutdown_timeout,
        } = self;

        let event_ch = fetcher.fetch().await;
        let handle = tokio::spawn(async move {
            consumer.consume(event_ch).await;
        });

        let signal = signal_handler.wait_for_shutdown().await;
        info!("received {}, stopping", signal);

        if let Err(e) = fetcher.shutdown().await {
            error!("fetcher shutdown failed: {:#}", e);
        }

        match timeout(shutdown_timeout, handle).await {
            Ok(res) => {
                res?;
                info!("graceful shutdown complete");
            }
            Err(_) => warn!("consumer did not drain within {:?}, exiting", shutdown_timeout),
        }

        Ok(())
    }
}
