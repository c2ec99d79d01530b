use std::sync::Arc;

use tracing::debug;

use crate::library::LibrarySource;
use crate::model::{ItemId, ItemRef, PlaylistItem, Singer, Song, same_item};

/// Parameters of a "what plays after `current`" query.
#[derive(Debug, Clone, Copy)]
pub struct NextQuery<'a> {
    /// Pick library songs at random instead of in order.
    pub random: bool,
    pub current: Option<&'a ItemRef>,
    /// Fetch a song from the library when the playlist is empty or `current`
    /// is its last item.
    pub fallback_to_library: bool,
    /// Remove the returned item from the live playlist (into history).
    pub remove_after_fetch: bool,
}

/// Ordered queue of playlist items. Insertion order is play order.
#[derive(Debug, Default)]
pub struct Playlist {
    items: Vec<ItemRef>,
    history: Vec<ItemRef>,
    selection: Option<ItemId>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items consumed from the live playlist, oldest first.
    pub fn history(&self) -> &[ItemRef] {
        &self.history
    }

    /// Item the view should highlight, if any.
    pub fn selection(&self) -> Option<ItemId> {
        self.selection
    }

    pub fn find(&self, id: ItemId) -> Option<&ItemRef> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id() == id)
    }

    /// Index of `current` in the playlist, `-1` when absent or `None`.
    fn index_of(&self, current: Option<&ItemRef>) -> isize {
        current
            .and_then(|c| self.items.iter().position(|i| same_item(i, c)))
            .map(|i| i as isize)
            .unwrap_or(-1)
    }

    /// Append a new item for `song`.
    pub fn enqueue(&mut self, song: Arc<Song>, singers: Vec<Singer>) -> ItemRef {
        let item = PlaylistItem::new(song, singers);
        self.items.push(item.clone());
        item
    }

    /// Append one item per song, in input order, and select the last one.
    pub fn enqueue_many(&mut self, songs: Vec<Arc<Song>>) -> Vec<ItemRef> {
        let added: Vec<ItemRef> = songs
            .into_iter()
            .map(|s| self.enqueue(s, Vec::new()))
            .collect();
        if let Some(last) = self.items.last() {
            self.selection = Some(last.id());
        }
        added
    }

    /// Insert items for `songs` starting at `index`, clamped to `0..=len`.
    pub fn insert(&mut self, index: usize, songs: Vec<Arc<Song>>) -> Vec<ItemRef> {
        let mut at = index.min(self.items.len());
        let mut added = Vec::with_capacity(songs.len());
        for song in songs {
            let item = PlaylistItem::new(song, Vec::new());
            self.items.insert(at, item.clone());
            added.push(item);
            at += 1;
        }
        added
    }

    /// Move the item `id` so it lands at visual slot `new_index`.
    ///
    /// `new_index` is the drop position counted before removal, so a forward
    /// move lands one slot earlier once the item itself is taken out.
    pub fn reorder(&mut self, id: ItemId, new_index: usize) -> bool {
        let Some(old) = self.position(id) else {
            return false;
        };
        let item = self.items.remove(old);
        let target = if new_index > old { new_index - 1 } else { new_index };
        let target = target.min(self.items.len());
        self.items.insert(target, item);
        true
    }

    pub fn remove(&mut self, id: ItemId) -> Option<ItemRef> {
        let pos = self.position(id)?;
        if self.selection == Some(id) {
            self.selection = None;
        }
        Some(self.items.remove(pos))
    }

    /// Remove `id` from the live playlist and record it in history.
    pub fn consume(&mut self, id: ItemId) -> Option<ItemRef> {
        let item = self.remove(id)?;
        self.history.push(item.clone());
        Some(item)
    }

    /// The item after `query.current`, optionally topping up from `library`.
    pub fn get_next(
        &mut self,
        query: NextQuery<'_>,
        library: &mut dyn LibrarySource,
    ) -> Option<ItemRef> {
        let idx = self.index_of(query.current);
        let last = self.items.len() as isize - 1;

        if query.fallback_to_library && (self.items.is_empty() || idx == last) {
            let fetched = if query.random {
                library.random_song()
            } else {
                library.next_song()
            };
            match fetched {
                Some(song) => {
                    debug!(title = %song.title, random = query.random, "playlist topped up from library");
                    self.enqueue(song, Vec::new());
                }
                None => debug!("library has nothing to offer"),
            }
        }

        let last = self.items.len() as isize - 1;
        if idx >= last {
            return None;
        }

        let next = self.items[(idx + 1) as usize].clone();
        if query.remove_after_fetch {
            self.consume(next.id());
        } else {
            self.selection = Some(next.id());
        }
        Some(next)
    }

    /// The item before `current`, if `current` is in the playlist and not first.
    pub fn get_previous(&mut self, current: Option<&ItemRef>) -> Option<ItemRef> {
        let idx = self.index_of(current);
        if idx <= 0 {
            return None;
        }
        let prev = self.items[(idx - 1) as usize].clone();
        self.selection = Some(prev.id());
        Some(prev)
    }

    pub fn has_previous(&self, current: Option<&ItemRef>) -> bool {
        self.index_of(current) > 0
    }

    /// Empty the live playlist. History is kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selection = None;
    }
}
