use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kiosk_core::{reduce, DisplayEvent, DisplayState};

/// Shared handle on one display's state. Clones observe the same state.
#[derive(Clone, Default)]
pub struct DisplayStore {
    inner: Arc<Mutex<DisplayState>>,
}

impl DisplayStore {
    pub fn new(state: DisplayState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> DisplayState {
        *self.lock()
    }

    /// Reduce `ev` into the stored state and return the states before and after.
    pub fn apply(&self, ev: DisplayEvent) -> (DisplayState, DisplayState) {
        let mut guard = self.lock();
        let before = *guard;
        let after = reduce(before, ev);
        *guard = after;
        (before, after)
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
