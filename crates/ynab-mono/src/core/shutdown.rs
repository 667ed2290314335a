use std::sync::Arc;

use async_trait::async_trait;

/// Stops a running component. Safe to call more than once.
#[async_trait]
pub trait Shutdowner: Send + Sync {
    async fn shutdown(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: Shutdowner + ?Sized> Shutdowner for Arc<T> {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.as_ref().shutdown().await
    }
}
