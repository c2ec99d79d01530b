//! Playback state machine: transport commands, end-of-song handling and
//! the observers that follow them.

mod events;
mod machine;
mod state;

pub use events::{Event, EventBus, NowPlaying, NowPlayingHandle};
pub use machine::{Jukebox, SEEK_THROTTLE};
pub use state::PlaybackState;
