use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::model::{Song, extension_of};

use super::archive::{ARCHIVE_EXTENSION, inspect_archive};

#[derive(Debug, Default)]
struct TagInfo {
    artist: Option<String>,
    title: Option<String>,
    duration: Option<Duration>,
}

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Case-insensitive path without extension; media and graphics files pair on it.
fn stem_key(path: &Path) -> String {
    path.with_extension("").to_string_lossy().to_lowercase()
}

/// Split a file stem into `(artist, title)` around `separator`.
///
/// Returns `None` unless the stem splits into exactly two non-empty parts.
pub fn parse_file_name(
    stem: &str,
    separator: &str,
    artist_before_title: bool,
) -> Option<(String, String)> {
    let parts: Vec<&str> = stem
        .split(separator)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 2 {
        return None;
    }
    let (artist, title) = if artist_before_title {
        (parts[0], parts[1])
    } else {
        (parts[1], parts[0])
    };
    Some((artist.to_string(), title.to_string()))
}

fn read_tags(path: &Path) -> TagInfo {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            return TagInfo::default();
        }
    };

    let duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

    match tagged.primary_tag().or_else(|| tagged.first_tag()) {
        Some(tag) => TagInfo {
            artist: non_empty(tag.artist()),
            title: non_empty(tag.title()),
            duration,
        },
        None => TagInfo {
            duration,
            ..TagInfo::default()
        },
    }
}

fn non_empty(v: Option<Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn describe(song: &mut Song, tags: &TagInfo, settings: &LibrarySettings) {
    let stem = song
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    describe_from(song, &stem, tags, settings);
}

fn describe_from(song: &mut Song, stem: &str, tags: &TagInfo, settings: &LibrarySettings) {
    let from_tags = match (&tags.artist, &tags.title) {
        (Some(a), Some(t)) => Some((a.clone(), t.clone())),
        _ => None,
    };
    let from_name = || {
        parse_file_name(
            stem,
            &settings.artist_title_separator,
            settings.artist_before_title,
        )
    };

    let parsed = if settings.parse_tags_first {
        from_tags.or_else(from_name)
    } else {
        from_name().or(from_tags)
    };

    match parsed {
        Some((artist, title)) => {
            song.artist = artist;
            song.title = title;
        }
        None => {
            song.artist = String::new();
            song.title = stem.to_string();
        }
    }
    song.duration = tags.duration;
}

/// Scan a single folder into songs, pairing media files with their graphics
/// companions.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Song> {
    let extensions = normalized_extensions(settings);
    let graphics_ext = settings
        .graphics_extension
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut media: Vec<PathBuf> = Vec::new();
    let mut archives: Vec<PathBuf> = Vec::new();
    let mut graphics: HashMap<String, PathBuf> = HashMap::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable library entry");
                None
            }
        })
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = extension_of(path);
        if !graphics_ext.is_empty() && ext == graphics_ext {
            graphics.insert(stem_key(path), path.to_path_buf());
        } else if settings.archives && ext == ARCHIVE_EXTENSION {
            archives.push(path.to_path_buf());
        } else if extensions.iter().any(|e| e == &ext) {
            media.push(path.to_path_buf());
        }
    }

    let mut songs = Vec::with_capacity(media.len() + archives.len());
    for path in media {
        let companion = graphics.get(&stem_key(&path)).cloned();
        if settings.require_graphics && companion.is_none() {
            debug!(path = %path.display(), "skipping media without graphics");
            continue;
        }

        let tags = read_tags(&path);
        let mut song = Song::new(path);
        if let Some(g) = companion {
            song = song.with_graphics(g);
        }
        describe(&mut song, &tags, settings);
        songs.push(song);
    }
    songs.extend(archives.into_iter().filter_map(|path| archive_song(path, settings)));

    sort_songs(&mut songs);
    songs
}

/// A song for a zipped mp3+cdg pair, named after the mp3 entry. Archives
/// that do not hold exactly one pair are skipped.
fn archive_song(path: PathBuf, settings: &LibrarySettings) -> Option<Song> {
    let contents = match inspect_archive(&path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping archive");
            return None;
        }
    };
    let mut song = Song::new(path);
    describe_from(&mut song, contents.media_stem(), &TagInfo::default(), settings);
    Some(song)
}

/// Scan several folders, dropping duplicates found through overlapping roots.
pub fn scan_folders(folders: &[PathBuf], settings: &LibrarySettings) -> Vec<Song> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut songs: Vec<Song> = Vec::new();
    for folder in folders {
        for song in scan(folder, settings) {
            if seen.insert(song.path.clone()) {
                songs.push(song);
            }
        }
    }
    sort_songs(&mut songs);
    songs
}

fn sort_songs(songs: &mut [Song]) {
    songs.sort_by(|a, b| {
        (a.artist.to_lowercase(), a.title.to_lowercase())
            .cmp(&(b.artist.to_lowercase(), b.title.to_lowercase()))
    });
}
