use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::model::ItemId;
use crate::tracker::Progress;

use super::state::PlaybackState;

/// Notifications published to the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    NowPlaying {
        item: ItemId,
        artist: String,
        title: String,
        duration_ms: u64,
    },
    Progress(Progress),
    StateChanged(PlaybackState),
    PlaylistChanged { len: usize },
    SelectionChanged(ItemId),
    PlaybackFailed { item: ItemId, reason: String },
}

/// Fan-out of [`Event`]s to any number of channel subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber; dropped receivers are pruned.
    pub fn emit(&mut self, event: Event) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Polling view of what the jukebox is doing right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlaying {
    pub state: PlaybackState,
    pub item: Option<ItemId>,
    pub artist: String,
    pub title: String,
    pub singers: String,
    pub progress: Option<Progress>,
    pub volume: f64,
}

pub type NowPlayingHandle = Arc<Mutex<NowPlaying>>;
