use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::library::{ExtractedSong, extract_archive};
use crate::model::Song;

use super::sink::create_sink;
use super::types::{Player, PlayerError};

/// `Player` backed by the default `rodio` output device.
///
/// Not `Send` on every platform: construct it on the thread that drives it.
/// Zipped songs are unpacked on play and the files removed on stop.
pub struct RodioPlayer {
    /// `None` once closed.
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    extracted: Option<ExtractedSong>,
    duration: Duration,
    volume: f32,
}

impl RodioPlayer {
    pub fn open_default() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped.
        stream.log_on_drop(false);

        Ok(Self {
            stream: Some(stream),
            sink: None,
            extracted: None,
            duration: Duration::ZERO,
            volume: 1.0,
        })
    }
}

impl Player for RodioPlayer {
    fn play(&mut self, song: &Song) -> Result<(), PlayerError> {
        self.stop();
        let Some(stream) = self.stream.as_ref() else {
            return Err(PlayerError::Output("output closed".to_string()));
        };

        let extracted = if song.is_archive() {
            Some(extract_archive(&song.path)?)
        } else {
            None
        };
        let media = extracted.as_ref().map_or(song.path.as_path(), |e| e.media.as_path());

        let (sink, duration) = create_sink(stream, media, song.duration)?;
        sink.set_volume(self.volume);
        sink.play();

        self.duration = duration.unwrap_or(Duration::ZERO);
        self.sink = Some(sink);
        self.extracted = extracted;
        debug!(path = %song.path.display(), duration_ms = self.duration.as_millis() as u64, "sink started");
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn unpause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.extracted = None;
        self.duration = Duration::ZERO;
    }

    fn close(&mut self) {
        self.stop();
        if self.stream.take().is_some() {
            debug!("output stream closed");
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.is_some()
    }

    fn position_ms(&self) -> u64 {
        match self.sink.as_ref() {
            // A drained sink stops advancing; report the end so the tracker
            // sees the song as finished.
            Some(s) if s.empty() => self.duration.as_millis() as u64,
            Some(s) => s.get_pos().as_millis() as u64,
            None => 0,
        }
    }

    fn duration_ms(&self) -> u64 {
        if self.sink.is_some() {
            self.duration.as_millis() as u64
        } else {
            0
        }
    }

    fn set_position_ms(&mut self, position_ms: u64) -> Result<(), PlayerError> {
        match self.sink.as_ref() {
            Some(s) => s
                .try_seek(Duration::from_millis(position_ms))
                .map_err(|e| PlayerError::Seek(e.to_string())),
            None => Ok(()),
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }
}
