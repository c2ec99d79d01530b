use std::sync::{Arc, Mutex, MutexGuard, mpsc::Receiver};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::config::PolicyHandle;
use crate::error::{Error, Result};
use crate::library::LibrarySource;
use crate::model::{ItemId, ItemRef, Singer, Song, same_item};
use crate::player::Player;
use crate::playlist::{NextQuery, Playlist};
use crate::tracker::{PositionTracker, Telemetry, TickReport};

use super::events::{Event, EventBus, NowPlaying, NowPlayingHandle};
use super::state::PlaybackState;

/// Minimum spacing between two accepted seeks.
pub const SEEK_THROTTLE: Duration = Duration::from_millis(500);

const MAX_VOLUME: f64 = 10.0;

/// The playback engine: playlist, current item, position tracker and the
/// external player, driven from a single thread.
pub struct Jukebox<P: Player, L: LibrarySource, C: Clock> {
    player: P,
    library: L,
    clock: C,
    policy: PolicyHandle,
    playlist: Playlist,
    tracker: PositionTracker,
    current: Option<ItemRef>,
    state: PlaybackState,
    volume: f64,
    last_seek: Option<Instant>,
    last_selection: Option<ItemId>,
    events: EventBus,
    now_playing: NowPlayingHandle,
}

impl<P: Player, L: LibrarySource, C: Clock> Jukebox<P, L, C> {
    pub fn new(player: P, library: L, clock: C, policy: PolicyHandle) -> Self {
        let volume = f64::from(player.volume()) * MAX_VOLUME;
        let now_playing = Arc::new(Mutex::new(NowPlaying {
            volume,
            ..NowPlaying::default()
        }));

        Self {
            player,
            library,
            clock,
            policy,
            playlist: Playlist::new(),
            tracker: PositionTracker::new(),
            current: None,
            state: PlaybackState::Stopped,
            volume,
            last_seek: None,
            last_selection: None,
            events: EventBus::new(),
            now_playing,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<&ItemRef> {
        self.current.as_ref()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    /// Last accepted volume level, `0.0..=10.0`.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.events.subscribe()
    }

    pub fn now_playing(&self) -> NowPlayingHandle {
        self.now_playing.clone()
    }

    /// Start playback.
    ///
    /// Resumes when paused. With no current item one is fetched from the
    /// playlist (falling back to the library); `Ok(false)` means there was
    /// nothing to play.
    pub fn play(&mut self) -> Result<bool> {
        if self.state == PlaybackState::Paused {
            self.player.unpause();
            self.tracker.clear_snapshot();
            self.set_state(PlaybackState::Playing);
            info!("resumed");
            return Ok(true);
        }

        if let Some(item) = self.current.clone() {
            self.start_item(item)?;
            return Ok(true);
        }

        let policy = self.policy.get();
        let next = self.playlist.get_next(
            NextQuery {
                random: !policy.sequential,
                current: None,
                fallback_to_library: true,
                remove_after_fetch: false,
            },
            &mut self.library,
        );
        self.playlist_changed();
        let Some(item) = next else {
            info!("nothing to play");
            return Ok(false);
        };

        self.start_fetched(item, policy.remove_after_fetch)?;
        Ok(true)
    }

    /// Toggle between playing and paused. Does nothing while stopped.
    pub fn pause(&mut self) {
        match self.state {
            PlaybackState::Playing => {
                self.tracker.clear_snapshot();
                self.player.pause();
                self.set_state(PlaybackState::Paused);
                info!("paused");
            }
            PlaybackState::Paused => {
                self.tracker.clear_snapshot();
                self.player.unpause();
                self.set_state(PlaybackState::Playing);
                info!("resumed");
            }
            PlaybackState::Stopped => debug!("pause ignored, nothing is playing"),
        }
    }

    /// Stop the player. The current item stays current.
    pub fn stop(&mut self) {
        self.player.stop();
        self.tracker.reset();
        if self.state.is_active() {
            info!("stopped");
        }
        self.set_state(PlaybackState::Stopped);
    }

    /// Advance to the item after the current one.
    ///
    /// The library is consulted when `force_library_fallback` is set or the
    /// stop-after-song policy is off. Returns `Ok(false)` when there is no
    /// next item; nothing changes in that case.
    pub fn next(&mut self, force_library_fallback: bool) -> Result<bool> {
        let policy = self.policy.get();
        let next = self.playlist.get_next(
            NextQuery {
                random: !policy.sequential,
                current: self.current.as_ref(),
                fallback_to_library: force_library_fallback || !policy.stop_after_song,
                remove_after_fetch: false,
            },
            &mut self.library,
        );
        self.playlist_changed();

        let Some(item) = next else {
            debug!("no next item");
            return Ok(false);
        };

        let seamless = self.state == PlaybackState::Playing && !policy.stop_after_song;
        debug!(item = %item.id(), seamless, "advancing");
        self.start_fetched(item, policy.remove_after_fetch)?;
        if !seamless {
            // Cue the item without playing it.
            self.stop();
        }
        Ok(true)
    }

    /// Go back one item, or restart the current song when the playlist is
    /// consumed as it plays.
    pub fn previous(&mut self) -> Result<bool> {
        let policy = self.policy.get();
        if policy.remove_after_fetch && self.state.is_active() {
            debug!("restarting current song");
            self.stop();
            return self.play();
        }

        let Some(prev) = self.playlist.get_previous(self.current.as_ref()) else {
            debug!("no previous item");
            return Ok(false);
        };
        self.playlist_changed();

        if self.state.is_active() {
            self.start_item(prev)?;
        } else {
            self.set_current(Some(prev));
        }
        Ok(true)
    }

    pub fn can_previous(&self) -> bool {
        let policy = self.policy.get();
        (policy.remove_after_fetch && self.state.is_active())
            || self.playlist.has_previous(self.current.as_ref())
    }

    pub fn can_pause(&self) -> bool {
        self.player.is_playing()
    }

    /// Seek the current song. Returns `Ok(false)` when the request was
    /// dropped by the throttle or nothing is playing.
    pub fn set_position(&mut self, position_ms: i64) -> Result<bool> {
        if position_ms < 0 {
            return Err(Error::NegativeSeek(position_ms));
        }
        if !self.state.is_active() {
            trace!("seek ignored, nothing is playing");
            return Ok(false);
        }

        let now = self.clock.now();
        if let Some(last) = self.last_seek {
            if now.saturating_duration_since(last) < SEEK_THROTTLE {
                trace!(position_ms, "seek throttled");
                return Ok(false);
            }
        }

        self.last_seek = Some(now);
        self.player.set_position_ms(position_ms as u64)?;
        debug!(position_ms, "seeked");
        Ok(true)
    }

    /// Set the output level, `0.0..=10.0`.
    pub fn set_volume(&mut self, level: f64) -> Result<()> {
        if !(0.0..=MAX_VOLUME).contains(&level) {
            return Err(Error::InvalidVolume(level));
        }
        self.player.set_volume((level / MAX_VOLUME) as f32);
        self.volume = level;
        self.lock_now_playing().volume = level;
        debug!(level, "volume set");
        Ok(())
    }

    /// Append `song`. When the playlist was empty and `start_if_empty` is
    /// set, the new item starts right away, replacing whatever was playing.
    pub fn enqueue(
        &mut self,
        song: Arc<Song>,
        singers: Vec<Singer>,
        start_if_empty: bool,
    ) -> Result<ItemRef> {
        let was_empty = self.playlist.is_empty();
        let item = self.playlist.enqueue(song, singers);
        info!(item = %item.id(), song = %item.song().display(), singers = %item.singers_text(), "enqueued");
        self.playlist_changed();

        if was_empty && start_if_empty {
            self.play_item(item.id())?;
        }
        Ok(item)
    }

    pub fn enqueue_many(&mut self, songs: Vec<Arc<Song>>) -> Vec<ItemRef> {
        let added = self.playlist.enqueue_many(songs);
        info!(count = added.len(), "enqueued songs");
        self.playlist_changed();
        added
    }

    pub fn insert(&mut self, index: usize, songs: Vec<Arc<Song>>) -> Vec<ItemRef> {
        let added = self.playlist.insert(index, songs);
        debug!(index, count = added.len(), "inserted songs");
        self.playlist_changed();
        added
    }

    pub fn reorder(&mut self, item: ItemId, index: usize) -> bool {
        let moved = self.playlist.reorder(item, index);
        if moved {
            debug!(%item, index, "reordered");
            self.playlist_changed();
        }
        moved
    }

    pub fn remove(&mut self, item: ItemId) -> Option<ItemRef> {
        let removed = self.playlist.remove(item)?;
        debug!(%item, "removed");
        self.playlist_changed();
        Some(removed)
    }

    /// Play a specific playlist item immediately.
    pub fn play_item(&mut self, id: ItemId) -> Result<bool> {
        let Some(item) = self.playlist.find(id).cloned() else {
            debug!(item = %id, "play_item: no such item");
            return Ok(false);
        };
        let policy = self.policy.get();

        self.stop();
        self.start_fetched(item, policy.remove_after_fetch)?;
        Ok(true)
    }

    /// Empty the live playlist. The current item keeps playing.
    pub fn clear(&mut self) {
        self.playlist.clear();
        info!("playlist cleared");
        self.playlist_changed();
    }

    /// One scheduler tick: sample the player, publish progress and react to
    /// the end of the song.
    pub fn tick(&mut self) -> Option<TickReport> {
        let now = self.clock.now();
        let sample = self.player.is_playing().then(|| Telemetry {
            position_ms: self.player.position_ms(),
            duration_ms: self.player.duration_ms(),
        });
        let paused = self.state != PlaybackState::Playing;

        let report = self.tracker.tick(now, sample, paused)?;
        self.lock_now_playing().progress = Some(report.progress.clone());
        self.events.emit(Event::Progress(report.progress.clone()));

        if report.end_of_song {
            if let Err(e) = self.handle_end_of_song() {
                warn!(error = %e, "could not advance after end of song");
            }
        }
        Some(report)
    }

    /// React to the current song finishing.
    pub fn handle_end_of_song(&mut self) -> Result<bool> {
        info!(
            item = ?self.current.as_ref().map(|i| i.id()),
            "end of song"
        );
        if self.policy.get().stop_after_song {
            self.stop();
        }
        self.next(false)
    }

    /// Stop and release the player.
    pub fn close(&mut self) {
        self.stop();
        self.player.close();
        if let Some(item) = self.current.as_ref() {
            item.set_playing(false);
        }
        debug!("player closed");
    }

    /// Start `item` and, once it plays, drop it from the live playlist when
    /// the policy consumes fetched items.
    fn start_fetched(&mut self, item: ItemRef, remove_after_fetch: bool) -> Result<()> {
        self.start_item(item.clone())?;
        if remove_after_fetch && self.playlist.consume(item.id()).is_some() {
            self.playlist_changed();
        }
        Ok(())
    }

    /// Play `item` and make it current. On failure the player is left
    /// stopped and `current` is untouched.
    fn start_item(&mut self, item: ItemRef) -> Result<()> {
        if self.state.is_active() {
            self.player.stop();
        }
        self.tracker.reset();

        if let Err(e) = self.player.play(item.song()) {
            warn!(item = %item.id(), path = %item.song().path.display(), error = %e, "playback failed");
            self.player.stop();
            self.set_state(PlaybackState::Stopped);
            self.events.emit(Event::PlaybackFailed {
                item: item.id(),
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        self.set_current(Some(item.clone()));
        item.set_playing(true);
        self.library.song_played(item.song());
        self.set_state(PlaybackState::Playing);

        let song = item.song();
        let duration_ms = self.player.duration_ms();
        info!(item = %item.id(), song = %song.display(), duration_ms, "now playing");
        {
            let mut np = self.lock_now_playing();
            np.item = Some(item.id());
            np.artist = song.artist.clone();
            np.title = song.title.clone();
            np.singers = item.singers_text();
            np.progress = None;
        }
        self.events.emit(Event::NowPlaying {
            item: item.id(),
            artist: song.artist.clone(),
            title: song.title.clone(),
            duration_ms,
        });
        Ok(())
    }

    fn set_current(&mut self, item: Option<ItemRef>) {
        if let Some(old) = self.current.as_ref() {
            let unchanged = item.as_ref().is_some_and(|new| same_item(old, new));
            if !unchanged {
                old.set_playing(false);
                self.tracker.reset();
            }
        }
        self.current = item;
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.lock_now_playing().state = state;
        self.events.emit(Event::StateChanged(state));
    }

    fn playlist_changed(&mut self) {
        self.events.emit(Event::PlaylistChanged {
            len: self.playlist.len(),
        });
        let selection = self.playlist.selection();
        if selection != self.last_selection {
            self.last_selection = selection;
            if let Some(id) = selection {
                self.events.emit(Event::SelectionChanged(id));
            }
        }
    }

    fn lock_now_playing(&self) -> MutexGuard<'_, NowPlaying> {
        self.now_playing.lock().unwrap_or_else(|p| p.into_inner())
    }
}
