use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, trace, warn};

use crate::clock::{Clock, Scheduler, SystemClock};
use crate::config::{PolicyHandle, Settings};
use crate::error::{Error, Result};
use crate::library::LibrarySource;
use crate::model::{ItemId, ItemRef, Singer, Song};
use crate::playback::{Event, Jukebox, NowPlayingHandle, PlaybackState};
use crate::player::{Player, PlayerError};

/// Requests accepted by the coordinator thread, applied in arrival order.
#[derive(Debug)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    Seek(i64),
    SetVolume(f64),
    Enqueue {
        song: Arc<Song>,
        singers: Vec<Singer>,
        start_if_empty: bool,
    },
    EnqueueMany(Vec<Arc<Song>>),
    Insert {
        index: usize,
        songs: Vec<Arc<Song>>,
    },
    Reorder {
        item: ItemId,
        index: usize,
    },
    Remove(ItemId),
    PlayItem(ItemId),
    Clear,
    Subscribe(Sender<Receiver<Event>>),
    Snapshot(Sender<Snapshot>),
    Shutdown,
}

/// Point-in-time copy of the engine state for readers outside the thread.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: PlaybackState,
    pub current: Option<ItemRef>,
    /// Total plays of the current song, as counted by the library.
    pub current_plays: u32,
    pub items: Vec<ItemRef>,
    pub history_len: usize,
    pub volume: f64,
    pub can_previous: bool,
    pub can_pause: bool,
}

pub struct Coordinator;

impl Coordinator {
    /// Start the coordinator thread.
    ///
    /// `make_player` runs on the new thread, since audio outputs are not
    /// always `Send`. Its failure is returned here.
    pub fn spawn<P, L, F>(
        settings: &Settings,
        policy: PolicyHandle,
        library: L,
        make_player: F,
    ) -> Result<CoordinatorHandle>
    where
        P: Player + 'static,
        L: LibrarySource + Send + 'static,
        F: FnOnce() -> std::result::Result<P, PlayerError> + Send + 'static,
    {
        Self::spawn_with_clock(settings, policy, library, SystemClock, make_player)
    }

    pub fn spawn_with_clock<P, L, C, F>(
        settings: &Settings,
        policy: PolicyHandle,
        library: L,
        clock: C,
        make_player: F,
    ) -> Result<CoordinatorHandle>
    where
        P: Player + 'static,
        L: LibrarySource + Send + 'static,
        C: Clock + Send + 'static,
        F: FnOnce() -> std::result::Result<P, PlayerError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<NowPlayingHandle, PlayerError>>();
        let tick = Duration::from_millis(settings.player.tick_interval_ms.max(1));
        let volume = settings.player.volume;

        let join = thread::Builder::new()
            .name("encore-coordinator".to_string())
            .spawn(move || {
                let player = match make_player() {
                    Ok(p) => p,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut jukebox = Jukebox::new(player, library, clock, policy);
                if let Err(e) = jukebox.set_volume(volume) {
                    warn!(error = %e, "ignoring configured volume");
                }
                let _ = ready_tx.send(Ok(jukebox.now_playing()));

                run_loop(&mut jukebox, &rx, tick);

                jukebox.close();
                info!("coordinator stopped");
            })?;

        match ready_rx.recv() {
            Ok(Ok(now_playing)) => Ok(CoordinatorHandle {
                tx,
                now_playing,
                join: Mutex::new(Some(join)),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e.into())
            }
            Err(_) => {
                let _ = join.join();
                Err(Error::Player(PlayerError::Output(
                    "coordinator exited during startup".to_string(),
                )))
            }
        }
    }
}

fn run_loop<P: Player, L: LibrarySource, C: Clock>(
    jukebox: &mut Jukebox<P, L, C>,
    rx: &Receiver<Command>,
    tick: Duration,
) {
    let mut scheduler = Scheduler::new(tick, jukebox.clock().now());
    info!(tick_ms = tick.as_millis() as u64, "coordinator running");

    loop {
        let wait = scheduler.time_until_due(jukebox.clock().now());
        match rx.recv_timeout(wait) {
            Ok(Command::Shutdown) => break,
            Ok(cmd) => apply(jukebox, cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if scheduler.poll(jukebox.clock().now()) {
            jukebox.tick();
        }
    }

    if scheduler.skipped() > 0 {
        info!(skipped = scheduler.skipped(), "ticks skipped while busy");
    }
}

fn apply<P: Player, L: LibrarySource, C: Clock>(jukebox: &mut Jukebox<P, L, C>, cmd: Command) {
    trace!(?cmd, "command");
    let outcome = match cmd {
        Command::Play => jukebox.play().map(drop),
        Command::Pause => {
            jukebox.pause();
            Ok(())
        }
        Command::Stop => {
            jukebox.stop();
            Ok(())
        }
        Command::Next => jukebox.next(true).map(drop),
        Command::Previous => jukebox.previous().map(drop),
        Command::Seek(ms) => jukebox.set_position(ms).map(drop),
        Command::SetVolume(level) => jukebox.set_volume(level),
        Command::Enqueue {
            song,
            singers,
            start_if_empty,
        } => jukebox.enqueue(song, singers, start_if_empty).map(drop),
        Command::EnqueueMany(songs) => {
            jukebox.enqueue_many(songs);
            Ok(())
        }
        Command::Insert { index, songs } => {
            jukebox.insert(index, songs);
            Ok(())
        }
        Command::Reorder { item, index } => {
            jukebox.reorder(item, index);
            Ok(())
        }
        Command::Remove(item) => {
            jukebox.remove(item);
            Ok(())
        }
        Command::PlayItem(item) => jukebox.play_item(item).map(drop),
        Command::Clear => {
            jukebox.clear();
            Ok(())
        }
        Command::Subscribe(reply) => {
            let _ = reply.send(jukebox.subscribe());
            Ok(())
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(snapshot(jukebox));
            Ok(())
        }
        Command::Shutdown => Ok(()),
    };

    if let Err(e) = outcome {
        warn!(error = %e, "command failed");
    }
}

fn snapshot<P: Player, L: LibrarySource, C: Clock>(jukebox: &Jukebox<P, L, C>) -> Snapshot {
    Snapshot {
        state: jukebox.state(),
        current: jukebox.current().cloned(),
        current_plays: jukebox
            .current()
            .map_or(0, |i| jukebox.library().times_played(i.song())),
        items: jukebox.playlist().items().to_vec(),
        history_len: jukebox.playlist().history().len(),
        volume: jukebox.volume(),
        can_previous: jukebox.can_previous(),
        can_pause: jukebox.can_pause(),
    }
}

/// Client side of a running coordinator.
pub struct CoordinatorHandle {
    tx: Sender<Command>,
    now_playing: NowPlayingHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl CoordinatorHandle {
    pub fn send(&self, cmd: Command) -> std::result::Result<(), SendError<Command>> {
        self.tx.send(cmd)
    }

    /// Register an event subscriber. `None` once the coordinator is gone.
    pub fn subscribe(&self) -> Option<Receiver<Event>> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Subscribe(reply)).ok()?;
        rx.recv().ok()
    }

    /// Wait for all earlier commands to be applied and copy the state.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Snapshot(reply)).ok()?;
        rx.recv().ok()
    }

    pub fn now_playing(&self) -> NowPlayingHandle {
        self.now_playing.clone()
    }

    /// Stop the thread and release the player. Safe to call twice.
    pub fn shutdown(&self) {
        let _ = self.send(Command::Shutdown);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
