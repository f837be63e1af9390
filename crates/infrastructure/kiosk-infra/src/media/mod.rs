//! Transition clip players.
//!
//! `play` returns a receiver that resolves once the clip finishes on its own.
//! Stopping a clip (or starting another) drops the sender, so a stopped clip
//! never reports completion.

use thiserror::Error;

pub mod command;
pub mod timed;

pub use command::CommandClipPlayer;
pub use timed::TimedClipPlayer;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid player command template: {0:?}")]
    Template(String),
    #[error("failed to start player {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
