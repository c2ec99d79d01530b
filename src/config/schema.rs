use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

/// Policy flags consulted whenever the engine picks the next song.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Take library songs in order (true) or at random (false) when the
    /// playlist runs dry.
    pub sequential: bool,
    /// Halt after every song, leaving the next one cued.
    pub stop_after_song: bool,
    /// Drop an item from the live playlist as soon as it is fetched as "next".
    pub remove_after_fetch: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sequential: true,
            stop_after_song: false,
            remove_after_fetch: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Initial volume on a 0..=10 scale.
    pub volume: f64,
    /// Progress polling interval (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: 10.0,
            tick_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folders scanned when none are given on the command line.
    pub folders: Vec<PathBuf>,
    /// Media file extensions (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Extension of the graphics file paired with a media file of the same stem.
    pub graphics_extension: String,
    /// Skip media files that have no graphics companion.
    pub require_graphics: bool,
    /// Pick up `.zip` archives holding one mp3 and one cdg as songs.
    pub archives: bool,
    /// Separator between artist and title in file names.
    pub artist_title_separator: String,
    /// Whether file names read `Artist<sep>Title` (true) or `Title<sep>Artist`.
    pub artist_before_title: bool,
    /// Try embedded tags before the file name.
    pub parse_tags_first: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            extensions: vec!["mp3".into(), "ogg".into(), "flac".into(), "wav".into()],
            graphics_extension: "cdg".to_string(),
            require_graphics: false,
            archives: true,
            artist_title_separator: " - ".to_string(),
            artist_before_title: true,
            parse_tags_first: false,
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
