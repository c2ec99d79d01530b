//! Utilities for creating `rodio` sinks from media files.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` together with the best known duration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::PlayerError;

/// Create a paused `Sink` for the media at `path`, returning it with the
/// decoded duration (falling back to `tagged`).
pub(super) fn create_sink(
    handle: &OutputStream,
    path: &Path,
    tagged: Option<Duration>,
) -> Result<(Sink, Option<Duration>), PlayerError> {
    let file = File::open(path).map_err(|source| PlayerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let duration = source.total_duration().or(tagged);

    let sink = Sink::connect_new(handle.mixer());
    sink.pause();
    sink.append(source);
    Ok((sink, duration))
}
