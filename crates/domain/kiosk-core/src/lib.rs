pub mod catalog;
pub mod command;
pub mod cue;
pub mod events;
pub mod reducer;
pub mod state;

pub use catalog::{Catalog, Slide};
pub use command::{ActionMessage, Command, CommandParseError};
pub use cue::{media_cue, MediaCue};
pub use events::DisplayEvent;
pub use reducer::reduce;
pub use state::{DisplayState, Phase, Position, TransitionKind};
