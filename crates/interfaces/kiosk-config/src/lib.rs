//! Central configuration constants for channel naming, endpoints and display defaults.

use std::time::Duration;

/// Well-known channel every display subscribes to.
pub const DEFAULT_CHANNEL: &str = "slides-channel";

/// Address the relay binds to when none is given.
pub const DEFAULT_RELAY_BIND: &str = "127.0.0.1:8787";

/// Relay base URL used by displays and remotes when none is given.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8787";

/// Relay route accepting `{"action": ...}` publish requests.
pub const PUBLISH_PATH: &str = "api/publish";

/// Relay route streaming newline-delimited action messages.
pub const SUBSCRIBE_PATH: &str = "api/subscribe";

/// Relay liveness route.
pub const HEALTH_PATH: &str = "api/health";

/// Content catalog location when none is given.
pub const DEFAULT_CATALOG: &str = "data.json";

/// Clip played while moving from idle onto the first slide.
pub const INTRO_CLIP: &str = "videos/intro.mp4";

/// Clip played while moving from the last slide back to idle.
pub const OUTRO_CLIP: &str = "videos/outro.mp4";

/// Headless playback length of a transition clip, in seconds.
pub const DEFAULT_CLIP_SECS: u64 = 8;

/// Upper bound for a configured headless clip length.
pub const MAX_CLIP_SECS: u64 = 600;

/// Capacity of a display's local event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

/// Per-channel fan-out buffer inside the relay. Subscribers lagging further lose messages.
pub const RELAY_CHANNEL_CAPACITY: usize = 256;

/// Buffer between a transport and the display consuming its subscription.
pub const SUBSCRIPTION_BUFFER: usize = 64;

/// Interval between keepalive newlines on a relay subscription stream.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// A subscription stream silent for this long is treated as lost.
pub const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(45);

/// Publish requests give up after this long.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// First reconnect delay after a subscription stream drops.
pub const RECONNECT_INITIAL: Duration = Duration::from_secs(1);

/// Reconnect delays double up to this cap.
pub const RECONNECT_MAX: Duration = Duration::from_secs(30);

/// Convenience function to clamp a clip length into the allowed range.
pub fn clamp_clip_secs(v: u64) -> u64 {
    v.min(MAX_CLIP_SECS)
}
