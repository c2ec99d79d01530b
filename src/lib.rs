//! encore: the playback and playlist core of a karaoke jukebox.
//!
//! A single coordinator thread owns the [`playback::Jukebox`], which ties the
//! [`playlist::Playlist`], the [`tracker::PositionTracker`], an external
//! [`player::Player`] and a [`library::LibrarySource`] together. Everything
//! else talks to it through [`runtime::CoordinatorHandle`].

pub mod clock;
pub mod config;
pub mod error;
pub mod library;
pub mod model;
pub mod playback;
pub mod player;
pub mod playlist;
pub mod runtime;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
