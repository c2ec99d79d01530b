//! The external player boundary.
//!
//! The engine only talks to the [`Player`] trait. [`RodioPlayer`] is the
//! production implementation on top of a `rodio` output stream.

mod output;
mod sink;
mod types;

pub use output::RodioPlayer;
pub use types::{Player, PlayerError};
