pub mod catalog;
pub mod channel;
pub mod media;
pub mod net;
pub mod relay;

// Re-exports for convenience
pub use catalog::{load_catalog, CatalogError};
pub use channel::{
    BroadcastChannel, ChannelError, HttpRelayChannel, MemoryChannel, ReconnectBackoff,
    Subscription,
};
pub use media::{CommandClipPlayer, MediaError, TimedClipPlayer};
pub use relay::{Relay, RelayError, RelaySubscriber};
