//! Zipped karaoke tracks.
//!
//! A song may live in a `.zip` holding exactly one mp3 and one cdg. The zip
//! is the song's path; the pair is extracted to a temporary folder when the
//! song is played.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::model::extension_of;

use super::error::LibraryError;

pub const ARCHIVE_EXTENSION: &str = "zip";
const MEDIA_EXTENSION: &str = "mp3";
const GRAPHICS_EXTENSION: &str = "cdg";

/// Entry names of the media and graphics files inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContents {
    pub media: String,
    pub graphics: String,
}

impl ArchiveContents {
    /// File stem of the media entry, used to name the song.
    pub fn media_stem(&self) -> &str {
        Path::new(&self.media)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.media)
    }
}

/// List the karaoke pair inside `path`.
///
/// Fails unless there is exactly one mp3 entry and exactly one cdg entry.
/// Other entries are ignored.
pub fn inspect_archive(path: &Path) -> Result<ArchiveContents, LibraryError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut media = None;
    let mut graphics = None;

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let slot = match extension_of(Path::new(&name)).as_str() {
            MEDIA_EXTENSION => &mut media,
            GRAPHICS_EXTENSION => &mut graphics,
            _ => continue,
        };
        if slot.replace(name).is_some() {
            return Err(LibraryError::NotKaraokeArchive(path.to_path_buf()));
        }
    }

    match (media, graphics) {
        (Some(media), Some(graphics)) => Ok(ArchiveContents { media, graphics }),
        _ => Err(LibraryError::NotKaraokeArchive(path.to_path_buf())),
    }
}

/// An archive unpacked for playback. The folder is deleted on drop.
#[derive(Debug)]
pub struct ExtractedSong {
    dir: TempDir,
    pub media: PathBuf,
    pub graphics: PathBuf,
}

impl ExtractedSong {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Unpack the karaoke pair of `path` into a fresh temporary folder.
pub fn extract_archive(path: &Path) -> Result<ExtractedSong, LibraryError> {
    let contents = inspect_archive(path)?;
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let dir = tempfile::Builder::new().prefix("encore-").tempdir()?;

    let media = extract_entry(&mut archive, &contents.media, dir.path(), path)?;
    let graphics = extract_entry(&mut archive, &contents.graphics, dir.path(), path)?;
    debug!(archive = %path.display(), dir = %dir.path().display(), "archive extracted");

    Ok(ExtractedSong {
        dir,
        media,
        graphics,
    })
}

fn extract_entry(
    archive: &mut ZipArchive<File>,
    name: &str,
    dir: &Path,
    archive_path: &Path,
) -> Result<PathBuf, LibraryError> {
    // Entries are flattened into `dir`; folder parts of the name are dropped.
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| LibraryError::NotKaraokeArchive(archive_path.to_path_buf()))?;
    let target = dir.join(file_name);

    let mut entry = archive.by_name(name)?;
    let mut out = File::create(&target)?;
    io::copy(&mut entry, &mut out)?;
    Ok(target)
}
