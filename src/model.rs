//! Data model: songs, singers and playlist items.
//!
//! A `Song` has value identity (its media file paths). A `PlaylistItem` has
//! reference identity: enqueueing the same song twice yields two distinct
//! items, each with its own `ItemId`.

mod item;
mod song;

pub use item::*;
pub use song::*;
