use std::fmt::Display;

use async_trait::async_trait;

/// Process signal that ends the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownKind {
    Terminate,
    Interrupt,
    Hangup,
}

impl ShutdownKind {
    pub fn signal_name(self) -> &'static str {
        match self {
            ShutdownKind::Terminate => "SIGTERM",
            ShutdownKind::Interrupt => "SIGINT",
            ShutdownKind::Hangup => "SIGHUP",
        }
    }
}

impl Display for ShutdownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.signal_name())
    }
}

#[async_trait]
pub trait SignalHandler: Send + Sync {
    async fn wait_for_shutdown(&self) -> ShutdownKind;
}
