/// Inputs to [`crate::reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    // Boot
    CatalogLoaded { slide_count: usize },

    // Remote
    Next,
    Prev,
    Reset,
    /// Stop the clip now and finish the transition as if it ended.
    Skip,

    // Presentation layer
    MediaEnded,
}
