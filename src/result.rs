//! Error types and the related `Result<T>`

use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use thiserror::Error;

pub type PakResult<T> = Result<T, PakError>;

#[derive(Debug, Error)]
pub enum PakError {
    /// The archive file couldn't be opened for reading.
    #[error("Couldn't open archive")]
    OpenFailed(#[source] io::Error),

    /// The archive is shorter than the fixed header, or the magic
    /// tag isn't `PACK`.
    #[error("Invalid PAK archive: {0}")]
    InvalidHeader(&'static str),

    /// The header's declared directory doesn't fit inside the file.
    #[error("Couldn't read the archive's directory")]
    InvalidFileEntry,

    /// A name doesn't fit in the directory record's 56-byte field.
    #[error("Name {0} is longer than 56 bytes")]
    NameTooLong(Utf8PathBuf),

    /// A source file's size doesn't fit in the record's 32-bit size field.
    #[error("{} is too large for a 32-bit size field", .0.display())]
    FileTooLarge(PathBuf),

    /// The concatenated payloads would push an offset past the
    /// 32-bit offset field.
    #[error("Archive contents too large for a 32-bit offset field")]
    ArchiveTooLarge,

    /// A file wasn't found at the provided name
    #[error("No file in the archive with the name {0}")]
    NotFound(Utf8PathBuf),

    /// An extraction target or the builder's output couldn't be created.
    #[error("Couldn't create {}", .0.display())]
    DestinationOpenFailed(PathBuf, #[source] io::Error),

    /// The builder couldn't open one of its source files.
    /// When this happens mid-write, the output is left partially written.
    #[error("Couldn't open source file {}", .0.display())]
    SourceOpenFailed(PathBuf, #[source] io::Error),

    /// An error from underlying I/O
    #[error("I/O Error")]
    Io(#[from] io::Error),
}
