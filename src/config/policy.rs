use std::sync::{Arc, Mutex};

use super::schema::PlaybackSettings;

/// Shared, mutable view of the playback policy flags.
///
/// The engine never caches these: every operation calls [`PolicyHandle::get`]
/// so a flag flipped from the console applies to the very next decision.
#[derive(Debug, Clone, Default)]
pub struct PolicyHandle(Arc<Mutex<PlaybackSettings>>);

impl PolicyHandle {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self(Arc::new(Mutex::new(settings)))
    }

    /// Current flags (a copy).
    pub fn get(&self) -> PlaybackSettings {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut PlaybackSettings)) {
        match self.0.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
