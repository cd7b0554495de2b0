//! Channel-per-subscription event bus.
//!
//! Each subscription owns a bounded queue and a consumer task. Every payload
//! the consumer receives runs as its own tokio task, so slow network calls in
//! one unit never hold up the next, and an error or panic inside a handler is
//! logged without taking the consumer down. Failed units are not retried.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queue depth per subscription.
const CHANNEL_BUFFER: usize = 100;

#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Channel this handler consumes.
    fn channel(&self) -> &str;

    async fn handle(&self, payload: Bytes) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<String, Vec<mpsc::Sender<Bytes>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `channel`. Every subscription receives its own
    /// copy of each published payload.
    pub fn subscribe(
        &mut self,
        channel: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> JoinHandle<()> {
        let channel = channel.into();
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        self.subscribers.entry(channel.clone()).or_default().push(tx);
        tokio::spawn(consume(channel, rx, handler))
    }

    /// Deliver `payload` to every subscriber of `channel`.
    ///
    /// Returns the number of subscriptions that accepted it.
    pub async fn publish(&self, channel: &str, payload: Bytes) -> usize {
        let Some(senders) = self.subscribers.get(channel) else {
            tracing::debug!(channel, "No subscriber for channel, dropping event");
            return 0;
        };

        let mut delivered = 0;
        for tx in senders {
            match tx.send(payload.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(channel, "Subscriber stopped, event not delivered"),
            }
        }
        delivered
    }
}

async fn consume(channel: String, mut rx: mpsc::Receiver<Bytes>, handler: Arc<dyn EventHandler>) {
    tracing::debug!(channel = %channel, "Event consumer started");

    while let Some(payload) = rx.recv().await {
        let handler = handler.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            let unit = tokio::spawn(async move { handler.handle(payload).await });
            match unit.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(channel = %channel, "Event handler failed: {e:#}");
                    crate::metrics::handler_failed(&channel);
                }
                Err(e) => {
                    tracing::error!(channel = %channel, "Event handler panicked: {e}");
                    crate::metrics::handler_failed(&channel);
                }
            }
        });
    }

    tracing::debug!(channel = %channel, "Event consumer stopped");
}
