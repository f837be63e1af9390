use std::time::Duration;

use camino::Utf8Path;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Headless player: a clip "plays" for a fixed duration.
pub struct TimedClipPlayer {
    duration: Duration,
    current: Option<CancellationToken>,
}

impl TimedClipPlayer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn play(&mut self, clip: &Utf8Path) -> oneshot::Receiver<()> {
        self.stop();

        let (done, finished) = oneshot::channel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let clip = clip.to_owned();
        let duration = self.duration;
        info!(%clip, ?duration, "playing clip");
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!(%clip, "clip stopped"),
                _ = tokio::time::sleep(duration) => {
                    let _ = done.send(());
                }
            }
        });

        finished
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for TimedClipPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
