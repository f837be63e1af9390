use camino::Utf8Path;
use tokio::sync::oneshot;

use crate::viewmodel::Frame;

pub use kiosk_infra::channel::{BroadcastChannel, ChannelError, Subscription};

/// Plays transition clips.
///
/// `play` replaces any clip already playing. The returned receiver resolves
/// when the clip ends on its own; it is dropped unresolved when the clip is
/// stopped or superseded.
pub trait MediaPort: Send + 'static {
    fn play(&mut self, clip: &Utf8Path) -> anyhow::Result<oneshot::Receiver<()>>;
    fn stop(&mut self);
}

/// Receives every frame the display should show.
pub trait FrameSink: Send + 'static {
    fn show(&mut self, frame: &Frame);
}

impl MediaPort for Box<dyn MediaPort> {
    fn play(&mut self, clip: &Utf8Path) -> anyhow::Result<oneshot::Receiver<()>> {
        (**self).play(clip)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

impl FrameSink for Box<dyn FrameSink> {
    fn show(&mut self, frame: &Frame) {
        (**self).show(frame)
    }
}
