//! Broadcast transports carrying action tokens from remotes to displays.
//!
//! Every transport is best effort: messages may be dropped, delayed or
//! duplicated, and no ordering holds across subscribers.

use kiosk_core::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub mod backoff;
pub mod http;
pub mod memory;

pub use backoff::ReconnectBackoff;
pub use http::HttpRelayChannel;
pub use memory::MemoryChannel;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid relay endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("relay unreachable: {0}")]
    Unreachable(String),
    #[error("relay rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("broadcast channel closed")]
    Closed,
}

/// Publish/subscribe capability shared by every transport.
#[async_trait::async_trait]
pub trait BroadcastChannel: Send + Sync + 'static {
    /// Publish one command. Success means the transport accepted it, not that
    /// any display received it.
    async fn publish(&self, command: Command) -> Result<(), ChannelError>;

    /// Start receiving every token published on this channel.
    async fn subscribe(&self) -> Result<Subscription, ChannelError>;
}

/// Live subscription handle. Yields raw action tokens in delivery order.
///
/// Dropping the handle unsubscribes; the transport's background task stops.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<String>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Next token, or `None` once the transport has shut down.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
