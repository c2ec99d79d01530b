use super::*;
use std::time::{Duration, Instant};

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

fn sample(position_ms: u64, duration_ms: u64) -> Option<Telemetry> {
    Some(Telemetry {
        position_ms,
        duration_ms,
    })
}

#[test]
fn no_media_is_a_no_op() {
    let mut tracker = PositionTracker::new();
    assert_eq!(tracker.tick(Instant::now(), None, false), None);
}

#[test]
fn progress_fraction_and_labels() {
    let p = Progress::new(90_000, 180_000);
    assert_eq!(p.fraction, 0.5);
    assert_eq!(p.elapsed, "01:30 | 03:00");
    assert_eq!(p.remaining, "-01:30");
}

#[test]
fn zero_duration_reports_zero_progress_and_never_ends() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    for ms in (0..2_000).step_by(100) {
        let report = tracker.tick(at(t0, ms), sample(5_000, 0), false).unwrap();
        assert_eq!(report.progress.fraction, 0.0);
        assert!(!report.end_of_song);
    }
}

#[test]
fn reaching_duration_ends_the_song() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    let report = tracker.tick(t0, sample(180_000, 180_000), false).unwrap();
    assert!(report.end_of_song);
}

#[test]
fn stalled_position_ends_the_song_before_duration() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();

    let first = tracker.tick(at(t0, 0), sample(90_000, 180_000), false).unwrap();
    assert!(!first.end_of_song);

    let second = tracker.tick(at(t0, 600), sample(90_000, 180_000), false).unwrap();
    assert!(second.end_of_song);
}

#[test]
fn stall_shorter_than_window_is_ignored() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    for ms in (0..500).step_by(100) {
        let r = tracker.tick(at(t0, ms), sample(90_000, 180_000), false).unwrap();
        assert!(!r.end_of_song, "fired early at {ms}ms");
    }
}

#[test]
fn advancing_position_never_ends_the_song() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    for ms in (0..5_000).step_by(100) {
        let r = tracker
            .tick(at(t0, ms), sample(10_000 + ms, 180_000), false)
            .unwrap();
        assert!(!r.end_of_song);
    }
}

#[test]
fn position_zero_never_counts_as_stalled() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    for ms in (0..3_000).step_by(100) {
        let r = tracker.tick(at(t0, ms), sample(0, 180_000), false).unwrap();
        assert!(!r.end_of_song);
    }
}

#[test]
fn paused_playback_never_ends_but_still_reports_progress() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    for ms in (0..3_000).step_by(100) {
        let r = tracker.tick(at(t0, ms), sample(90_000, 180_000), true).unwrap();
        assert!(!r.end_of_song);
        assert_eq!(r.progress.position_ms, 90_000);
    }
    let r = tracker.tick(at(t0, 3_000), sample(180_000, 180_000), true).unwrap();
    assert!(!r.end_of_song);
}

#[test]
fn end_of_song_fires_once_per_session() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    assert!(tracker.tick(t0, sample(180_000, 180_000), false).unwrap().end_of_song);
    assert!(!tracker.tick(at(t0, 100), sample(180_000, 180_000), false).unwrap().end_of_song);

    tracker.reset();
    assert!(tracker.tick(at(t0, 200), sample(180_000, 180_000), false).unwrap().end_of_song);
}

#[test]
fn clearing_snapshot_restarts_the_window() {
    let t0 = Instant::now();
    let mut tracker = PositionTracker::new();
    tracker.tick(at(t0, 0), sample(90_000, 180_000), false);
    // Pause/resume clears the snapshot; the next reading re-seeds it.
    tracker.clear_snapshot();
    let r = tracker.tick(at(t0, 600), sample(90_000, 180_000), false).unwrap();
    assert!(!r.end_of_song);
    let r = tracker.tick(at(t0, 1_100), sample(90_000, 180_000), false).unwrap();
    assert!(r.end_of_song);
}
