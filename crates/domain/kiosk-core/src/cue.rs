use crate::events::DisplayEvent;
use crate::state::{DisplayState, TransitionKind};

/// Media side effect implied by a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCue {
    Play(TransitionKind),
    Stop,
}

/// Derive the media side effect of applying `ev` to `before`, yielding `after`.
///
/// A clip starts whenever a transition begins. A clip is stopped only when a
/// `Skip` cut the transition short; natural ends need no action.
pub fn media_cue(before: &DisplayState, ev: DisplayEvent, after: &DisplayState) -> Option<MediaCue> {
    match (before.transition, after.transition) {
        (None, Some(kind)) => Some(MediaCue::Play(kind)),
        (Some(_), None) if ev == DisplayEvent::Skip => Some(MediaCue::Stop),
        _ => None,
    }
}
