use std::io;

use thiserror::Error;

use crate::config::SettingsError;
use crate::player::PlayerError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("volume {0} is outside 0..=10")]
    InvalidVolume(f64),
    #[error("cannot seek to negative position {0} ms")]
    NegativeSeek(i64),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
