//! Test doubles shared by the unit tests.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::library::LibrarySource;
use crate::model::Song;
use crate::player::{Player, PlayerError};

pub fn song(name: &str) -> Arc<Song> {
    Arc::new(Song::new(format!("/karaoke/{name}.mp3")).with_artist_title("Artist", name))
}

/// Library that hands out pre-scripted songs.
#[derive(Debug, Default)]
pub struct ScriptedLibrary {
    pub sequential: VecDeque<Arc<Song>>,
    pub random: VecDeque<Arc<Song>>,
    pub played: Vec<PathBuf>,
}

impl ScriptedLibrary {
    pub fn new(names: &[&str]) -> Self {
        Self {
            sequential: names.iter().map(|n| song(n)).collect(),
            ..Self::default()
        }
    }

    pub fn with_random(mut self, names: &[&str]) -> Self {
        self.random = names.iter().map(|n| song(n)).collect();
        self
    }
}

impl LibrarySource for ScriptedLibrary {
    fn next_song(&mut self) -> Option<Arc<Song>> {
        self.sequential.pop_front()
    }

    fn random_song(&mut self) -> Option<Arc<Song>> {
        self.random.pop_front()
    }

    fn song_played(&mut self, song: &Song) {
        self.played.push(song.path.clone());
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub loaded: Option<PathBuf>,
    pub paused: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: f32,
    pub seeks: Vec<u64>,
    pub failing: HashSet<PathBuf>,
    pub closed: bool,
}

/// In-memory player. Clones share state so a test can inspect and steer
/// the player after handing it to the engine.
#[derive(Debug, Clone)]
pub struct FakePlayer {
    state: Arc<Mutex<FakeState>>,
    /// Duration reported for every newly loaded song.
    pub default_duration_ms: u64,
}

impl Default for FakePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                volume: 1.0,
                ..FakeState::default()
            })),
            default_duration_ms: 180_000,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn fail_on(&self, path: &Path) {
        self.state().failing.insert(path.to_path_buf());
    }

    pub fn set_position(&self, position_ms: u64) {
        self.state().position_ms = position_ms;
    }

    pub fn loaded(&self) -> Option<PathBuf> {
        self.state().loaded.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl Player for FakePlayer {
    fn play(&mut self, song: &Song) -> Result<(), PlayerError> {
        let mut s = self.state();
        s.calls.push(format!("play {}", song.title));
        if s.failing.contains(&song.path) {
            s.loaded = None;
            return Err(PlayerError::Decode {
                path: song.path.clone(),
                reason: "corrupt".into(),
            });
        }
        s.loaded = Some(song.path.clone());
        s.paused = false;
        s.position_ms = 0;
        s.duration_ms = self.default_duration_ms;
        Ok(())
    }

    fn pause(&mut self) {
        let mut s = self.state();
        s.calls.push("pause".into());
        if s.loaded.is_some() {
            s.paused = true;
        }
    }

    fn unpause(&mut self) {
        let mut s = self.state();
        s.calls.push("unpause".into());
        s.paused = false;
    }

    fn stop(&mut self) {
        let mut s = self.state();
        s.calls.push("stop".into());
        s.loaded = None;
        s.paused = false;
        s.position_ms = 0;
        s.duration_ms = 0;
    }

    fn close(&mut self) {
        self.stop();
        let mut s = self.state();
        s.calls.push("close".into());
        s.closed = true;
    }

    fn is_playing(&self) -> bool {
        self.state().loaded.is_some()
    }

    fn position_ms(&self) -> u64 {
        let s = self.state();
        if s.loaded.is_some() { s.position_ms } else { 0 }
    }

    fn duration_ms(&self) -> u64 {
        let s = self.state();
        if s.loaded.is_some() { s.duration_ms } else { 0 }
    }

    fn set_position_ms(&mut self, position_ms: u64) -> Result<(), PlayerError> {
        let mut s = self.state();
        s.calls.push(format!("seek {position_ms}"));
        s.seeks.push(position_ms);
        s.position_ms = position_ms;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.state().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.state().volume = volume;
    }
}
