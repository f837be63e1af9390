use std::fmt;

use camino::Utf8PathBuf;
use kiosk_core::{Catalog, DisplayState, Phase, TransitionKind};

use crate::media::MediaClips;

/// What the screen shows for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Idle,
    Slide {
        index: usize,
        count: usize,
        title: String,
        image: String,
    },
    /// Position points past the loaded catalog.
    Blank { index: usize },
    Media {
        kind: TransitionKind,
        clip: Utf8PathBuf,
    },
}

pub fn frame(state: &DisplayState, catalog: &Catalog, clips: &MediaClips) -> Frame {
    match state.phase() {
        Phase::Idle => Frame::Idle,
        Phase::Transitioning { kind, .. } => Frame::Media {
            kind,
            clip: clips.for_transition(kind).to_owned(),
        },
        Phase::Showing(index) => match catalog.get(index) {
            Some(slide) => Frame::Slide {
                index,
                count: catalog.len(),
                title: slide.title.clone(),
                image: slide.image.clone(),
            },
            None => Frame::Blank { index },
        },
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Idle => write!(f, "idle"),
            Frame::Slide {
                index,
                count,
                title,
                image,
            } => write!(f, "slide {}/{count}: {title} [{image}]", index + 1),
            Frame::Blank { index } => write!(f, "slide {} (blank)", index + 1),
            Frame::Media { kind, clip } => write!(f, "playing {} clip {clip}", kind.label()),
        }
    }
}
