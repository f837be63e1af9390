pub mod dispatcher;
pub mod kernel;
pub mod media;
pub mod ports;
pub mod remote;
pub mod store;
pub mod viewmodel;

pub use dispatcher::{route, route_token, InterceptPolicy};
pub use kernel::{DisplayInput, DisplayKernel, DisplayOptions};
pub use media::{MediaClips, PlaybackId};
pub use ports::*;
pub use remote::RemoteSender;
pub use store::DisplayStore;
pub use viewmodel::*;
