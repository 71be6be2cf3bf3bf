//! Tools for reading a PAK archive.
//!
//! To start, create a [`PakArchive`] and point it at a file with
//! [`PakArchive::open()`].
//!
//! [`PakArchive`]: struct.PakArchive.html
//! [`PakArchive::open()`]: struct.PakArchive.html#method.open

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use log::*;

use crate::result::*;
use crate::spec;

/// One file in the archive's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The file's name, `/`-separated
    pub name: Utf8PathBuf,
    /// Absolute byte offset of the file's contents in the archive
    pub offset: u32,
    /// Size of the file's contents in bytes
    pub size: u32,
}

/// A file's location in the archive, as returned by [`PakArchive::stat()`]
///
/// [`PakArchive::stat()`]: struct.PakArchive.html#method.stat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub offset: u32,
    pub size: u32,
}

/// A handle to a PAK archive on disk
///
/// The handle starts out empty; [`open()`] binds it to a file and loads
/// its directory into memory. Lookups and iteration then run entirely
/// off that in-memory directory. [`read()`] and [`extract()`] share the
/// handle's single file cursor, so a handle isn't safe to share between
/// threads — open one handle per thread instead.
///
/// ```no_run
/// # use pakr::PakArchive;
/// let mut archive = PakArchive::new();
/// archive.open("pak0.pak")?;
/// for entry in archive.entries() {
///     println!("{} ({} bytes)", entry.name, entry.size);
/// }
/// # Ok::<(), pakr::PakError>(())
/// ```
///
/// [`open()`]: #method.open
/// [`read()`]: #method.read
/// [`extract()`]: #method.extract
#[derive(Debug, Default)]
pub struct PakArchive {
    file: Option<File>,
    entries: Vec<Entry>,
    lookup: HashMap<Utf8PathBuf, usize>,
}

impl PakArchive {
    /// Creates an empty handle, bound to nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the archive at `path` and loads its directory.
    ///
    /// Any previously opened archive is closed first.
    /// On failure the handle is left closed and empty.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> PakResult<()> {
        self.close();
        let path = path.as_ref();

        let mut file = File::open(path).map_err(PakError::OpenFailed)?;
        let file_size = file.metadata().map_err(PakError::OpenFailed)?.len();

        if file_size < spec::HEADER_SIZE as u64 {
            return Err(PakError::InvalidHeader("file is shorter than the header"));
        }

        let mut header_bytes = [0u8; spec::HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        let header = spec::Header::parse(&header_bytes)?;
        trace!("{:?}", header);

        let directory_end = u64::from(header.directory_offset) + u64::from(header.directory_size);
        if directory_end > file_size {
            return Err(PakError::InvalidFileEntry);
        }

        // A ragged tail (directory size not a multiple of the record size)
        // is ignored, as Quake ignored it.
        let entry_count = header.directory_size as usize / spec::RECORD_SIZE;
        debug!("{} directory entries", entry_count);

        // Read the whole directory block in one go.
        let mut directory = vec![0u8; entry_count * spec::RECORD_SIZE];
        file.seek(SeekFrom::Start(u64::from(header.directory_offset)))?;
        file.read_exact(&mut directory)
            .map_err(|_| PakError::InvalidFileEntry)?;

        let mut entries = Vec::with_capacity(entry_count);
        let mut lookup = HashMap::with_capacity(entry_count);

        let mut remaining = directory.as_slice();
        for index in 0..entry_count {
            let record = spec::DirectoryRecord::parse_and_consume(&mut remaining);
            trace!("{:?}", record);

            let entry = Entry {
                name: spec::unpack_name(record.name),
                offset: record.offset,
                size: record.size,
            };
            // Duplicate names: the last record wins.
            lookup.insert(entry.name.clone(), index);
            entries.push(entry);
        }

        self.file = Some(file);
        self.entries = entries;
        self.lookup = lookup;
        Ok(())
    }

    /// Closes the archive, releasing the file handle
    /// and dropping the loaded directory.
    ///
    /// Safe to call on an already-closed handle.
    pub fn close(&mut self) {
        self.file = None;
        self.entries.clear();
        self.lookup.clear();
    }

    /// Returns the number of files in the archive's directory,
    /// or 0 if no archive is open.
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entries of the archive's directory, in on-disk order.
    ///
    /// Every record is here, including any shadowed by a duplicate name.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Looks up a file's offset and size by exact name.
    pub fn stat<P: AsRef<Utf8Path>>(&self, name: P) -> PakResult<FileStat> {
        let entry = self.entry(name.as_ref())?;
        Ok(FileStat {
            offset: entry.offset,
            size: entry.size,
        })
    }

    /// Reads a file's contents into `buf`,
    /// returning the number of bytes read.
    ///
    /// Reads `min(buf.len(), the file's stored size)` bytes —
    /// a large buffer won't pull in the next file's bytes.
    pub fn read<P: AsRef<Utf8Path>>(&mut self, name: P, buf: &mut [u8]) -> PakResult<usize> {
        let name = name.as_ref();
        let FileStat { offset, size } = self.stat(name)?;
        let file = match self.file.as_mut() {
            Some(f) => f,
            None => return Err(PakError::NotFound(name.to_owned())),
        };

        let to_read = buf.len().min(size as usize);
        file.seek(SeekFrom::Start(u64::from(offset)))?;
        file.read_exact(&mut buf[..to_read])?;
        Ok(to_read)
    }

    /// Extracts a file to `destination`, creating or truncating it.
    ///
    /// Parent directories are *not* created; that's the caller's job.
    pub fn extract<P, Q>(&mut self, name: P, destination: Q) -> PakResult<()>
    where
        P: AsRef<Utf8Path>,
        Q: AsRef<Path>,
    {
        let name = name.as_ref();
        let destination = destination.as_ref();

        // Look the name up before touching the filesystem.
        let FileStat { offset, size } = self.stat(name)?;
        let file = match self.file.as_mut() {
            Some(f) => f,
            None => return Err(PakError::NotFound(name.to_owned())),
        };

        let mut sink = File::create(destination)
            .map_err(|e| PakError::DestinationOpenFailed(destination.to_owned(), e))?;

        debug!("Extracting {} to {}", name, destination.display());
        file.seek(SeekFrom::Start(u64::from(offset)))?;
        let copied = io::copy(&mut file.by_ref().take(u64::from(size)), &mut sink)?;
        if copied != u64::from(size) {
            return Err(PakError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{name} is truncated: {copied} of {size} bytes"),
            )));
        }
        Ok(())
    }

    fn entry(&self, name: &Utf8Path) -> PakResult<&Entry> {
        self.lookup
            .get(name)
            .map(|&index| &self.entries[index])
            .ok_or_else(|| PakError::NotFound(name.to_owned()))
    }
}
