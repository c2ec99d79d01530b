use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A playable library entry.
///
/// Identity is the primary media file plus, when present on both sides, the
/// auxiliary graphics (CDG) file.
#[derive(Debug, Clone)]
pub struct Song {
    pub path: PathBuf,
    pub graphics_path: Option<PathBuf>,
    pub artist: String,
    pub title: String,
    /// Lowercase extension of `path`, without the dot.
    pub extension: String,
    /// Plays known when the song was loaded. Plays during this run are
    /// counted by the library, see `MediaLibrary::times_played`.
    pub times_played: u32,
    /// Duration read from tags at scan time, if any.
    pub duration: Option<Duration>,
}

impl Song {
    /// Create a song for `path` with the title defaulting to the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            path,
            graphics_path: None,
            artist: String::new(),
            title,
            extension,
            times_played: 0,
            duration: None,
        }
    }

    pub fn with_graphics(mut self, graphics_path: impl Into<PathBuf>) -> Self {
        self.graphics_path = Some(graphics_path.into());
        self
    }

    pub fn with_artist_title(mut self, artist: impl Into<String>, title: impl Into<String>) -> Self {
        self.artist = artist.into();
        self.title = title.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// True when the song carries a graphics overlay (mp3+cdg pair).
    pub fn has_graphics(&self) -> bool {
        self.graphics_path.is_some()
    }

    /// True when `path` is a zip holding the media and graphics pair.
    pub fn is_archive(&self) -> bool {
        self.extension == "zip"
    }

    /// Copy the parsed metadata from a freshly scanned instance of the same song.
    pub fn refresh_from(&mut self, fresh: &Song) {
        self.artist = fresh.artist.clone();
        self.title = fresh.title.clone();
        self.extension = fresh.extension.clone();
    }

    /// `Artist - Title`, or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        if self.path != other.path {
            return false;
        }
        match (&self.graphics_path, &other.graphics_path) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl Eq for Song {}

// Only the primary path participates: songs that compare equal may differ in
// whether a graphics path is known.
impl Hash for Song {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// A person queued to sing a playlist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Singer {
    pub screen_name: String,
    pub description: Option<String>,
}

impl Singer {
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            description: None,
        }
    }
}
