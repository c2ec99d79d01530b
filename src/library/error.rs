use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("bad archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0:?} does not hold exactly one mp3 and one cdg")]
    NotKaraokeArchive(PathBuf),
}
