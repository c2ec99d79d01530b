//! Media library: scanning folders into songs and handing them out when the
//! playlist runs dry.

mod archive;
mod error;
mod report;
mod scan;
mod source;

pub use archive::{
    ARCHIVE_EXTENSION, ArchiveContents, ExtractedSong, extract_archive, inspect_archive,
};
pub use error::LibraryError;
pub use report::{Duplicate, export_csv, find_duplicates, write_duplicates};
pub use scan::{parse_file_name, scan, scan_folders};
pub use source::{LibrarySource, MediaLibrary};
