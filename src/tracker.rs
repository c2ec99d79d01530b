//! Position tracking and end-of-song detection.
//!
//! The external player sometimes stalls just short of the end without ever
//! reporting the final position. Besides the plain `position >= duration`
//! check, the tracker keeps a `(time, position)` snapshot refreshed at most
//! every [`STALL_WINDOW`]; a nonzero position that has not moved across one
//! full window counts as the end of the song.

mod progress;

use std::time::{Duration, Instant};

use tracing::{debug, trace};

pub use progress::{Progress, format_mmss};

/// Minimum spacing between two position snapshots.
pub const STALL_WINDOW: Duration = Duration::from_millis(500);

/// One reading from the player.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Telemetry {
    pub position_ms: u64,
    pub duration_ms: u64,
}

/// What a tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub progress: Progress,
    pub end_of_song: bool,
}

#[derive(Debug, Default)]
pub struct PositionTracker {
    snapshot: Option<(Instant, u64)>,
    /// End-of-song already raised for this playing session.
    ended: bool,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh playing session (new song, restart, or stop).
    pub fn reset(&mut self) {
        self.snapshot = None;
        self.ended = false;
    }

    /// Forget the stagnation snapshot without re-arming end-of-song.
    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Process one scheduler tick.
    ///
    /// `sample` is `None` when the player has no active media; the tick is
    /// then a no-op.
    pub fn tick(
        &mut self,
        now: Instant,
        sample: Option<Telemetry>,
        paused: bool,
    ) -> Option<TickReport> {
        let sample = sample?;
        let progress = Progress::new(sample.position_ms, sample.duration_ms);

        let end_of_song = !paused && !self.ended && self.detect_end(now, sample);
        if end_of_song {
            self.ended = true;
            debug!(
                position_ms = sample.position_ms,
                duration_ms = sample.duration_ms,
                "end of song detected"
            );
        }

        Some(TickReport {
            progress,
            end_of_song,
        })
    }

    fn detect_end(&mut self, now: Instant, sample: Telemetry) -> bool {
        if sample.duration_ms == 0 || sample.position_ms == 0 {
            return false;
        }
        if sample.position_ms >= sample.duration_ms {
            return true;
        }

        match self.snapshot {
            None => {
                self.snapshot = Some((now, sample.position_ms));
                false
            }
            Some((taken_at, position)) => {
                if now.saturating_duration_since(taken_at) < STALL_WINDOW {
                    return false;
                }
                self.snapshot = Some((now, sample.position_ms));
                let stalled = position == sample.position_ms;
                if stalled {
                    trace!(position_ms = position, "position stalled across window");
                }
                stalled
            }
        }
    }
}

#[cfg(test)]
mod tests;
