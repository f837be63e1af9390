/// Where the display sits in the slide sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Pre-show screen, reported as index `-1`.
    #[default]
    Idle,
    Slide(usize),
}

impl Position {
    /// Integer form with `-1` standing for idle.
    pub fn as_index(self) -> i64 {
        match self {
            Position::Idle => -1,
            Position::Slide(i) => i as i64,
        }
    }

    pub fn slide(self) -> Option<usize> {
        match self {
            Position::Idle => None,
            Position::Slide(i) => Some(i),
        }
    }
}

/// A media-gated move between idle and the slide sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Intro clip, then land on the first (or queued) slide.
    IdleToFirst,
    /// Outro clip, then return to idle.
    LastToIdle,
}

impl TransitionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransitionKind::IdleToFirst => "idle-to-first",
            TransitionKind::LastToIdle => "last-to-idle",
        }
    }
}

/// Per-display state. Lives for the lifetime of the display process only.
///
/// While `transition` is set the display is playing a clip and slide position
/// only changes through `queued_advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub slide_count: usize,
    pub position: Position,
    pub transition: Option<TransitionKind>,
    /// Highest slide requested by `Next` during an intro, in `[0, slide_count - 1]`.
    pub queued_advance: Option<usize>,
}

/// Coarse view of [`DisplayState`] matching the three machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Showing(usize),
    Transitioning {
        kind: TransitionKind,
        queued: Option<usize>,
    },
}

impl DisplayState {
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_count,
            ..Default::default()
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn phase(&self) -> Phase {
        match (self.transition, self.position) {
            (Some(kind), _) => Phase::Transitioning {
                kind,
                queued: self.queued_advance,
            },
            (None, Position::Idle) => Phase::Idle,
            (None, Position::Slide(i)) => Phase::Showing(i),
        }
    }

    pub(crate) fn last_slide(&self) -> Option<usize> {
        self.slide_count.checked_sub(1)
    }
}
