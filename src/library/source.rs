use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Song;

use super::error::LibraryError;
use super::report::{Duplicate, export_csv, find_duplicates};

/// Supplies songs when the playlist is exhausted.
///
/// Returning `None` is a normal "nothing to play" outcome.
pub trait LibrarySource {
    /// Next song in library order.
    fn next_song(&mut self) -> Option<Arc<Song>>;
    /// A song chosen uniformly at random.
    fn random_song(&mut self) -> Option<Arc<Song>>;
    /// Called after `song` started playing.
    fn song_played(&mut self, _song: &Song) {}
    /// Total plays of `song`, including this run.
    fn times_played(&self, song: &Song) -> u32 {
        song.times_played
    }
}

/// In-memory library built from a folder scan.
///
/// Songs are shared as `Arc` snapshots with the playlist and the console, so
/// plays during this run are counted here by path, never on the snapshots.
pub struct MediaLibrary {
    songs: Vec<Arc<Song>>,
    plays: HashMap<PathBuf, u32>,
    /// Index of the song handed out last by `next_song` (or selected).
    cursor: Option<usize>,
    rng: StdRng,
}

impl MediaLibrary {
    pub fn new(songs: Vec<Song>) -> Self {
        Self::with_rng(songs, StdRng::from_os_rng())
    }

    /// Deterministic random selection, for reproducible runs.
    pub fn with_seed(songs: Vec<Song>, seed: u64) -> Self {
        Self::with_rng(songs, StdRng::seed_from_u64(seed))
    }

    fn with_rng(songs: Vec<Song>, rng: StdRng) -> Self {
        Self {
            songs: songs.into_iter().map(Arc::new).collect(),
            plays: HashMap::new(),
            cursor: None,
            rng,
        }
    }

    pub fn songs(&self) -> &[Arc<Song>] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Song>> {
        self.songs.get(index)
    }

    /// Songs sharing an artist and title.
    pub fn duplicates(&self) -> Vec<Duplicate> {
        find_duplicates(&self.songs)
    }

    /// See [`export_csv`].
    pub fn export_csv(&self, target: &Path) -> Result<(PathBuf, PathBuf), LibraryError> {
        export_csv(&self.songs, target)
    }

    /// Move the sequential cursor so that `next_song` continues after `path`.
    pub fn select(&mut self, path: &Path) -> bool {
        match self.songs.iter().position(|s| s.path == path) {
            Some(i) => {
                self.cursor = Some(i);
                true
            }
            None => false,
        }
    }

    /// Merge a rescan: known songs get their metadata refreshed, new songs are
    /// appended, songs no longer on disk are dropped.
    pub fn refresh(&mut self, fresh: Vec<Song>) {
        let selected: Option<PathBuf> = self
            .cursor
            .and_then(|i| self.songs.get(i))
            .map(|s| s.path.clone());

        let mut known: HashMap<PathBuf, Arc<Song>> = self
            .songs
            .drain(..)
            .map(|s| (s.path.clone(), s))
            .collect();

        let mut merged = Vec::with_capacity(fresh.len());
        for song in fresh {
            match known.remove(&song.path) {
                Some(mut existing) if *existing == song => {
                    Arc::make_mut(&mut existing).refresh_from(&song);
                    merged.push(existing);
                }
                _ => merged.push(Arc::new(song)),
            }
        }
        self.songs = merged;
        let songs = &self.songs;
        self.plays.retain(|path, _| songs.iter().any(|s| &s.path == path));

        self.cursor = selected.and_then(|p| self.songs.iter().position(|s| s.path == p));
    }
}

impl LibrarySource for MediaLibrary {
    fn next_song(&mut self) -> Option<Arc<Song>> {
        if self.songs.is_empty() {
            return None;
        }
        let next = match self.cursor {
            Some(i) => (i + 1) % self.songs.len(),
            None => 0,
        };
        self.cursor = Some(next);
        Some(self.songs[next].clone())
    }

    fn random_song(&mut self) -> Option<Arc<Song>> {
        if self.songs.is_empty() {
            return None;
        }
        let i = self.rng.random_range(0..self.songs.len());
        Some(self.songs[i].clone())
    }

    fn song_played(&mut self, song: &Song) {
        if self.songs.iter().any(|s| s.as_ref() == song) {
            *self.plays.entry(song.path.clone()).or_default() += 1;
        }
    }

    fn times_played(&self, song: &Song) -> u32 {
        song.times_played + self.plays.get(&song.path).copied().unwrap_or(0)
    }
}
