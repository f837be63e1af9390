pub mod commands;
pub mod shutdown;
pub mod sink;

use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use kiosk_app_core::{InterceptPolicy, MediaClips};
use kiosk_config::{
    DEFAULT_CATALOG, DEFAULT_CHANNEL, DEFAULT_CLIP_SECS, DEFAULT_RELAY_URL, INTRO_CLIP, OUTRO_CLIP,
};

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum CliPolicy {
    #[default]
    QueueDuringIntro,
    SkipAlways,
}

impl From<CliPolicy> for InterceptPolicy {
    fn from(p: CliPolicy) -> Self {
        match p {
            CliPolicy::QueueDuringIntro => InterceptPolicy::QueueDuringIntro,
            CliPolicy::SkipAlways => InterceptPolicy::SkipAlways,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliAction {
    Next,
    Prev,
    Reset,
}

/// Relay endpoint and channel shared by displays and remotes.
#[derive(Args, Clone, Debug)]
pub struct RelayTarget {
    #[arg(long, env = "KIOSK_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub relay: String,
    #[arg(long, env = "KIOSK_CHANNEL", default_value = DEFAULT_CHANNEL)]
    pub channel: String,
}

#[derive(Args, Clone, Debug)]
pub struct DisplayArgs {
    #[command(flatten)]
    pub target: RelayTarget,
    #[arg(long, env = "KIOSK_CATALOG", default_value = DEFAULT_CATALOG)]
    pub catalog: String,
    #[arg(long, default_value = INTRO_CLIP)]
    pub intro: Utf8PathBuf,
    #[arg(long, default_value = OUTRO_CLIP)]
    pub outro: Utf8PathBuf,
    #[arg(long, value_enum, default_value_t = CliPolicy::QueueDuringIntro)]
    pub policy: CliPolicy,
    #[arg(
        long,
        env = "KIOSK_PLAYER_CMD",
        help = "External player template, e.g. \"mpv --fs {clip}\""
    )]
    pub player_cmd: Option<String>,
    #[arg(long, default_value_t = DEFAULT_CLIP_SECS, help = "Clip length when no player is set")]
    pub clip_secs: u64,
}

impl DisplayArgs {
    pub fn clips(&self) -> MediaClips {
        MediaClips {
            intro: self.intro.clone(),
            outro: self.outro.clone(),
        }
    }
}
