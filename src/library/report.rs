//! Library reports: duplicate songs and CSV listings.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::model::Song;

use super::error::LibraryError;

/// Songs sharing an artist and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub artist: String,
    pub title: String,
    pub paths: Vec<PathBuf>,
}

/// Group `songs` by exact artist and title and keep groups with more than
/// one file, sorted by artist then title.
pub fn find_duplicates(songs: &[Arc<Song>]) -> Vec<Duplicate> {
    let mut groups: BTreeMap<(&str, &str), Vec<PathBuf>> = BTreeMap::new();
    for song in songs {
        groups
            .entry((song.artist.as_str(), song.title.as_str()))
            .or_default()
            .push(song.path.clone());
    }

    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((artist, title), paths)| Duplicate {
            artist: artist.to_string(),
            title: title.to_string(),
            paths,
        })
        .collect()
}

pub fn write_duplicates(dupes: &[Duplicate], out: &mut impl Write) -> io::Result<()> {
    if dupes.is_empty() {
        return writeln!(out, "no duplicates found");
    }
    writeln!(out, "duplicates:")?;
    for d in dupes {
        writeln!(out, "{} - {}", d.artist, d.title)?;
        for path in &d.paths {
            writeln!(out, "\t- {}", path.display())?;
        }
    }
    Ok(())
}

/// `<target minus .csv>-<suffix>.csv`
fn export_path(target: &Path, suffix: &str) -> PathBuf {
    let base = match target.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => target.with_extension(""),
        _ => target.to_path_buf(),
    };
    let mut name = base.into_os_string();
    name.push(format!("-{suffix}.csv"));
    PathBuf::from(name)
}

fn write_rows<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), LibraryError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (a, b) in rows {
        writer.write_record([a, b])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the library as two listings next to `target`: one row per
/// distinct artist and title, sorted by artist in `-ArtistTitle.csv` and by
/// title in `-TitleArtist.csv`. Existing files are replaced.
pub fn export_csv(songs: &[Arc<Song>], target: &Path) -> Result<(PathBuf, PathBuf), LibraryError> {
    let by_artist: BTreeSet<(&str, &str)> = songs
        .iter()
        .map(|s| (s.artist.as_str(), s.title.as_str()))
        .collect();
    let by_title: BTreeSet<(&str, &str)> = by_artist.iter().map(|&(a, t)| (t, a)).collect();

    let artist_path = export_path(target, "ArtistTitle");
    let title_path = export_path(target, "TitleArtist");
    write_rows(&artist_path, by_artist.iter().copied())?;
    write_rows(&title_path, by_title.iter().copied())?;

    info!(
        rows = by_artist.len(),
        artist_title = %artist_path.display(),
        title_artist = %title_path.display(),
        "library exported"
    );
    Ok((artist_path, title_path))
}
