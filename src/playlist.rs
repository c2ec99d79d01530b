//! The ordered play queue and its navigation rules.

mod engine;

pub use engine::{NextQuery, Playlist};

#[cfg(test)]
mod tests;
