use std::time::Duration;

/// Normalized progress published to observers on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub position_ms: u64,
    pub duration_ms: u64,
    /// `position / duration`, 0 when the duration is unknown.
    pub fraction: f64,
    /// `MM:SS | MM:SS` (elapsed and total).
    pub elapsed: String,
    /// `-MM:SS` left to play.
    pub remaining: String,
}

impl Progress {
    pub fn new(position_ms: u64, duration_ms: u64) -> Self {
        let fraction = if duration_ms == 0 {
            0.0
        } else {
            position_ms as f64 / duration_ms as f64
        };
        let position = Duration::from_millis(position_ms);
        let duration = Duration::from_millis(duration_ms);

        Self {
            position_ms,
            duration_ms,
            fraction,
            elapsed: format!("{} | {}", format_mmss(position), format_mmss(duration)),
            remaining: format!("-{}", format_mmss(duration.saturating_sub(position))),
        }
    }
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
