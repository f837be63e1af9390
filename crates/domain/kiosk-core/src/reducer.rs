use crate::events::DisplayEvent;
use crate::state::{DisplayState, Position, TransitionKind};

/// Apply one event to the display state. Pure and synchronous; side effects
/// are derived afterwards with [`crate::media_cue`].
pub fn reduce(mut state: DisplayState, ev: DisplayEvent) -> DisplayState {
    match ev {
        DisplayEvent::CatalogLoaded { slide_count } => catalog_loaded(&mut state, slide_count),
        DisplayEvent::Next => next(&mut state),
        DisplayEvent::Prev => prev(&mut state),
        DisplayEvent::Reset => {
            if !state.is_transitioning() {
                state.position = Position::Idle;
                state.queued_advance = None;
            }
        }
        DisplayEvent::Skip | DisplayEvent::MediaEnded => media_ended(&mut state),
    }
    state
}

fn catalog_loaded(state: &mut DisplayState, slide_count: usize) {
    state.slide_count = slide_count;

    // Keep position and queue inside the new bounds.
    let last = state.last_slide();
    if let Position::Slide(i) = state.position {
        state.position = match last {
            Some(last) => Position::Slide(i.min(last)),
            None => Position::Idle,
        };
    }
    state.queued_advance = match (state.queued_advance, last) {
        (Some(q), Some(last)) => Some(q.min(last)),
        _ => None,
    };
}

fn next(state: &mut DisplayState) {
    let Some(last) = state.last_slide() else {
        return;
    };

    match state.transition {
        Some(TransitionKind::IdleToFirst) => {
            let queued = state.queued_advance.unwrap_or(0);
            if queued < last {
                state.queued_advance = Some(queued + 1);
            }
        }
        Some(TransitionKind::LastToIdle) => {}
        None => match state.position {
            Position::Idle => {
                state.transition = Some(TransitionKind::IdleToFirst);
                state.queued_advance = None;
            }
            Position::Slide(i) if i < last => state.position = Position::Slide(i + 1),
            Position::Slide(_) => {
                state.transition = Some(TransitionKind::LastToIdle);
                state.queued_advance = None;
            }
        },
    }
}

fn prev(state: &mut DisplayState) {
    if state.slide_count == 0 || state.is_transitioning() {
        return;
    }

    state.position = match state.position {
        Position::Slide(i) if i > 0 => Position::Slide(i - 1),
        Position::Slide(_) | Position::Idle => Position::Idle,
    };
}

fn media_ended(state: &mut DisplayState) {
    match state.transition {
        Some(TransitionKind::IdleToFirst) => {
            state.position = Position::Slide(state.queued_advance.unwrap_or(0));
        }
        Some(TransitionKind::LastToIdle) => state.position = Position::Idle,
        None => return,
    }
    state.transition = None;
    state.queued_advance = None;
}
