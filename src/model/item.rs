use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::song::{Singer, Song};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle for a playlist item, used by commands coming from outside
/// the coordinator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of the play queue: a song plus the singers queued for it.
#[derive(Debug)]
pub struct PlaylistItem {
    id: ItemId,
    song: Arc<Song>,
    singers: Vec<Singer>,
    added_at: Instant,
    playing: AtomicBool,
}

/// Shared reference to a playlist item. Identity is the allocation, see
/// [`same_item`].
pub type ItemRef = Arc<PlaylistItem>;

impl PlaylistItem {
    pub fn new(song: Arc<Song>, singers: Vec<Singer>) -> ItemRef {
        Self::added_at(song, singers, Instant::now())
    }

    pub fn added_at(song: Arc<Song>, singers: Vec<Singer>, added_at: Instant) -> ItemRef {
        Arc::new(Self {
            id: ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed)),
            song,
            singers,
            added_at,
            playing: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn song(&self) -> &Arc<Song> {
        &self.song
    }

    pub fn singers(&self) -> &[Singer] {
        &self.singers
    }

    /// Whether this item is the one the playback engine considers current.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    /// Singer screen names joined with `", "`.
    pub fn singers_text(&self) -> String {
        self.singers
            .iter()
            .map(|s| s.screen_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Human-readable time since the item was enqueued, relative to `now`.
    pub fn time_since_added(&self, now: Instant) -> String {
        format_since_added(now.saturating_duration_since(self.added_at))
    }
}

pub fn same_item(a: &ItemRef, b: &ItemRef) -> bool {
    Arc::ptr_eq(a, b)
}

pub(crate) fn format_since_added(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    let mut parts: Vec<String> = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours} hour(s)"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} minute(s)"));
    } else if secs < 60 {
        parts.push("< 1 minute".to_string());
    }
    parts.join(" ")
}
