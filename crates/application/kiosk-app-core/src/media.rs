//! Adapters from the infrastructure clip players to [`MediaPort`].

use camino::{Utf8Path, Utf8PathBuf};
use kiosk_core::TransitionKind;
use kiosk_infra::{CommandClipPlayer, TimedClipPlayer};
use tokio::sync::oneshot;

use crate::ports::MediaPort;

/// Identifies one clip playback so late completions can be told apart.
pub type PlaybackId = uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaClips {
    pub intro: Utf8PathBuf,
    pub outro: Utf8PathBuf,
}

impl Default for MediaClips {
    fn default() -> Self {
        Self {
            intro: Utf8PathBuf::from(kiosk_config::INTRO_CLIP),
            outro: Utf8PathBuf::from(kiosk_config::OUTRO_CLIP),
        }
    }
}

impl MediaClips {
    pub fn for_transition(&self, kind: TransitionKind) -> &Utf8Path {
        match kind {
            TransitionKind::IdleToFirst => &self.intro,
            TransitionKind::LastToIdle => &self.outro,
        }
    }
}

impl MediaPort for TimedClipPlayer {
    fn play(&mut self, clip: &Utf8Path) -> anyhow::Result<oneshot::Receiver<()>> {
        Ok(TimedClipPlayer::play(self, clip))
    }

    fn stop(&mut self) {
        TimedClipPlayer::stop(self)
    }
}

impl MediaPort for CommandClipPlayer {
    fn play(&mut self, clip: &Utf8Path) -> anyhow::Result<oneshot::Receiver<()>> {
        Ok(CommandClipPlayer::play(self, clip)?)
    }

    fn stop(&mut self) {
        CommandClipPlayer::stop(self)
    }
}
