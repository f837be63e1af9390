//! Maps incoming action tokens onto state-machine events.

use kiosk_core::{Command, DisplayEvent, DisplayState, TransitionKind};
use tracing::debug;

/// What a `Next` does while a transition clip is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterceptPolicy {
    /// Queue advances during the intro; skip the outro.
    #[default]
    QueueDuringIntro,
    /// Skip whichever clip is playing.
    SkipAlways,
}

pub fn route(state: &DisplayState, command: Command, policy: InterceptPolicy) -> DisplayEvent {
    match command {
        Command::Next => match (state.transition, policy) {
            (None, _) => DisplayEvent::Next,
            (Some(TransitionKind::IdleToFirst), InterceptPolicy::QueueDuringIntro) => {
                DisplayEvent::Next
            }
            (Some(_), _) => DisplayEvent::Skip,
        },
        Command::Prev => DisplayEvent::Prev,
        Command::Reset => DisplayEvent::Reset,
        Command::Skip => DisplayEvent::Skip,
    }
}

/// Route a raw token. Tokens outside the command vocabulary yield `None`.
pub fn route_token(
    state: &DisplayState,
    token: &str,
    policy: InterceptPolicy,
) -> Option<DisplayEvent> {
    match token.parse::<Command>() {
        Ok(command) => Some(route(state, command, policy)),
        Err(e) => {
            debug!(error = %e, "ignoring action");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use kiosk_core::{reduce, Position};

    use super::*;

    fn intro(n: usize) -> DisplayState {
        reduce(DisplayState::new(n), DisplayEvent::Next)
    }

    fn outro(n: usize) -> DisplayState {
        let last = DisplayState {
            slide_count: n,
            position: Position::Slide(n - 1),
            ..Default::default()
        };
        reduce(last, DisplayEvent::Next)
    }

    #[test]
    fn next_queues_during_intro_by_default() {
        let policy = InterceptPolicy::default();
        assert_eq!(route(&intro(4), Command::Next, policy), DisplayEvent::Next);
        assert_eq!(route(&outro(4), Command::Next, policy), DisplayEvent::Skip);
    }

    #[test]
    fn skip_always_skips_both_clips() {
        let policy = InterceptPolicy::SkipAlways;
        assert_eq!(route(&intro(4), Command::Next, policy), DisplayEvent::Skip);
        assert_eq!(route(&outro(4), Command::Next, policy), DisplayEvent::Skip);
    }

    #[test]
    fn outside_transitions_commands_map_one_to_one() {
        let state = DisplayState::new(4);
        for policy in [InterceptPolicy::QueueDuringIntro, InterceptPolicy::SkipAlways] {
            assert_eq!(route(&state, Command::Next, policy), DisplayEvent::Next);
            assert_eq!(route(&state, Command::Prev, policy), DisplayEvent::Prev);
            assert_eq!(route(&state, Command::Reset, policy), DisplayEvent::Reset);
            assert_eq!(route(&state, Command::Skip, policy), DisplayEvent::Skip);
        }
    }

    #[test]
    fn prev_and_reset_pass_through_mid_transition() {
        // The reducer ignores them; routing does not rewrite them.
        let state = intro(4);
        let policy = InterceptPolicy::SkipAlways;
        assert_eq!(route(&state, Command::Prev, policy), DisplayEvent::Prev);
        assert_eq!(route(&state, Command::Reset, policy), DisplayEvent::Reset);
    }

    #[test]
    fn unknown_tokens_are_dropped() {
        let state = DisplayState::new(4);
        let policy = InterceptPolicy::default();
        assert_eq!(route_token(&state, "next", policy), Some(DisplayEvent::Next));
        assert_eq!(route_token(&state, "NEXT", policy), None);
        assert_eq!(route_token(&state, "jump", policy), None);
        assert_eq!(route_token(&state, "", policy), None);
    }
}
