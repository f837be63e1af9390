use kiosk_core::Command;
use tracing::{info, warn};

use crate::ports::{BroadcastChannel, ChannelError};

/// Stateless emitter used by remote controls.
///
/// Each call publishes exactly one token. A failed publish is returned as is
/// and never retried.
pub struct RemoteSender<C> {
    channel: C,
}

impl<C: BroadcastChannel> RemoteSender<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub async fn send_next(&self) -> Result<(), ChannelError> {
        self.send(Command::Next).await
    }

    pub async fn send_prev(&self) -> Result<(), ChannelError> {
        self.send(Command::Prev).await
    }

    pub async fn send_reset(&self) -> Result<(), ChannelError> {
        self.send(Command::Reset).await
    }

    async fn send(&self, command: Command) -> Result<(), ChannelError> {
        match self.channel.publish(command).await {
            Ok(()) => {
                info!(%command, "action sent");
                Ok(())
            }
            Err(e) => {
                warn!(%command, error = %e, "failed to send action");
                Err(e)
            }
        }
    }
}
