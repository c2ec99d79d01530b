//! Time sources and the tick scheduler.
//!
//! The engine never reads the system clock directly; it asks a [`Clock`], so
//! tests can drive time by hand with [`ManualClock`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::trace;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Fixed-cadence tick schedule.
///
/// Ticks that fall due while the previous one is still being processed are
/// dropped, never queued: a late poll fires once and re-arms from `now`.
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    next_due: Instant,
    skipped: u64,
}

impl Scheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
            skipped: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long a caller may block before the next tick is due.
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Returns true when a tick is due and arms the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }

        let late = now - self.next_due;
        if late >= self.interval {
            let missed = (late.as_nanos() / self.interval.as_nanos().max(1)) as u64;
            self.skipped += missed;
            trace!(missed, "ticks skipped");
            self.next_due = now + self.interval;
        } else {
            self.next_due += self.interval;
        }
        true
    }

    /// Total ticks dropped because processing fell behind.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced_and_is_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        other.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - t0, Duration::from_millis(250));
    }

    #[test]
    fn scheduler_fires_on_cadence() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut s = Scheduler::new(ms(100), t0);

        assert!(!s.poll(t0 + ms(50)));
        assert_eq!(s.time_until_due(t0 + ms(50)), ms(50));
        assert!(s.poll(t0 + ms(100)));
        assert!(!s.poll(t0 + ms(150)));
        assert!(s.poll(t0 + ms(210)));
        assert_eq!(s.skipped(), 0);
    }

    #[test]
    fn scheduler_drops_missed_ticks_instead_of_replaying_them() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut s = Scheduler::new(ms(100), t0);

        // Processing stalled for half a second.
        assert!(s.poll(t0 + ms(550)));
        assert_eq!(s.skipped(), 4);
        // No backlog: the next tick is a full interval away.
        assert!(!s.poll(t0 + ms(600)));
        assert_eq!(s.time_until_due(t0 + ms(550)), ms(100));
        assert!(s.poll(t0 + ms(650)));
    }
}
