use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::library::LibraryError;
use crate::model::Song;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("cannot unpack song: {0}")]
    Archive(#[from] LibraryError),
}

/// Media player driven by the playback engine.
///
/// Every call must be safe when no media is loaded: queries then report 0 or
/// `false`, and transport calls do nothing.
pub trait Player {
    /// Load `song` and start playing it from the beginning.
    fn play(&mut self, song: &Song) -> Result<(), PlayerError>;
    fn pause(&mut self);
    fn unpause(&mut self);
    /// Unload the current media.
    fn stop(&mut self);
    /// Release the output device.
    fn close(&mut self);
    /// True while media is loaded, paused or not.
    fn is_playing(&self) -> bool;
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn set_position_ms(&mut self, position_ms: u64) -> Result<(), PlayerError>;
    /// Linear gain in `0.0..=1.0`.
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
}
