use kiosk_core::Command;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{BroadcastChannel, ChannelError, Subscription};

/// In-process broadcast channel. Clones share the same fan-out.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    tx: broadcast::Sender<String>,
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new(kiosk_config::RELAY_CHANNEL_CAPACITY)
    }
}

impl MemoryChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcast a token without checking it against the command vocabulary.
    /// Publishing with nobody subscribed is not an error.
    pub fn publish_raw(&self, token: impl Into<String>) {
        let _ = self.tx.send(token.into());
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Direct receiver on the fan-out, counted by `subscriber_count` until dropped.
    pub(crate) fn receiver(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

#[async_trait::async_trait]
impl BroadcastChannel for MemoryChannel {
    async fn publish(&self, command: Command) -> Result<(), ChannelError> {
        self.publish_raw(command.token());
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, ChannelError> {
        let mut source = self.receiver();
        let (tx, rx) = mpsc::channel(kiosk_config::SUBSCRIPTION_BUFFER);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = stop.cancelled() => break,
                    received = source.recv() => received,
                };
                match received {
                    Ok(token) => {
                        if tx.send(token).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "subscriber lagged; dropped broadcast messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("memory subscription closed");
        });

        Ok(Subscription::new(rx, cancel))
    }
}
