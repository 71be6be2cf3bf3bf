//! Tools for building a new PAK archive.
//!
//! [`PakBuilder`] is write-once: queue up files with [`add()`],
//! then lay the whole archive out with [`write()`].
//!
//! [`PakBuilder`]: struct.PakBuilder.html
//! [`add()`]: struct.PakBuilder.html#method.add
//! [`write()`]: struct.PakBuilder.html#method.write

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use log::*;

use crate::result::*;
use crate::spec;

/// A file queued for the archive.
/// The offset stays unresolved until `write()` lays the archive out.
#[derive(Debug)]
struct PendingFile {
    source: PathBuf,
    name: Utf8PathBuf,
    size: u32,
    offset: u32,
}

/// Builds a new PAK archive from files on disk
///
/// ```no_run
/// # use pakr::PakBuilder;
/// let mut builder = PakBuilder::new();
/// builder.add("assets/e1m1.bsp", "maps/e1m1.bsp")?;
/// builder.add("assets/menu1.wav", "sound/misc/menu1.wav")?;
/// builder.write("pak0.pak")?;
/// # Ok::<(), pakr::PakError>(())
/// ```
///
/// There's no removal or reordering; entries land in the archive
/// in the order they were added.
#[derive(Debug, Default)]
pub struct PakBuilder {
    files: Vec<PendingFile>,
}

impl PakBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of files queued so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Queues the file at `source` for the archive under `name`.
    ///
    /// Fails with [`NameTooLong`] if `name` doesn't fit the 56-byte
    /// name field, and with [`FileTooLarge`] if the source doesn't fit
    /// the 32-bit size field. Neither failure changes the builder.
    ///
    /// The source's size is recorded now; don't change the file
    /// between `add()` and `write()`.
    ///
    /// [`NameTooLong`]: ../result/enum.PakError.html#variant.NameTooLong
    /// [`FileTooLarge`]: ../result/enum.PakError.html#variant.FileTooLarge
    pub fn add<P, N>(&mut self, source: P, name: N) -> PakResult<()>
    where
        P: AsRef<Path>,
        N: AsRef<Utf8Path>,
    {
        let source = source.as_ref();
        let name = name.as_ref();

        // Validate the name against the fixed field before anything else.
        spec::pack_name(name.as_str())?;

        let size = fs::metadata(source)
            .map_err(|e| PakError::SourceOpenFailed(source.to_owned(), e))?
            .len();
        let size =
            u32::try_from(size).map_err(|_| PakError::FileTooLarge(source.to_owned()))?;

        self.files.push(PendingFile {
            source: source.to_owned(),
            name: name.to_owned(),
            size,
            offset: 0,
        });
        Ok(())
    }

    /// Writes the archive to `out`.
    ///
    /// Pass 1 writes the header and the directory, resolving each
    /// entry's offset from a running cursor that starts just past the
    /// directory. Pass 2 copies each source file into its reserved
    /// span. A source that can't be opened in pass 2 aborts the write
    /// and leaves a partially written, invalid archive behind —
    /// there's no rollback.
    pub fn write<P: AsRef<Path>>(&mut self, out: P) -> PakResult<()> {
        let out = out.as_ref();

        let file = File::create(out)
            .map_err(|e| PakError::DestinationOpenFailed(out.to_owned(), e))?;
        let mut sink = BufWriter::new(file);

        let directory_size = self
            .files
            .len()
            .checked_mul(spec::RECORD_SIZE)
            .and_then(|s| u32::try_from(s).ok())
            .ok_or(PakError::ArchiveTooLarge)?;
        let header = spec::Header {
            directory_offset: spec::HEADER_SIZE as u32,
            directory_size,
        };
        trace!("{:?}", header);
        sink.write_all(&header.to_bytes())?;

        // Pass 1: the directory, with offsets resolved as we go.
        // Payloads start immediately after the directory block.
        let mut cursor = spec::HEADER_SIZE as u64 + u64::from(directory_size);
        for file in &mut self.files {
            let offset = u32::try_from(cursor).map_err(|_| PakError::ArchiveTooLarge)?;
            file.offset = offset;
            cursor += u64::from(file.size);

            let name = spec::pack_name(file.name.as_str())?;
            let record = spec::DirectoryRecord {
                name: &name,
                offset,
                size: file.size,
            };
            trace!("{:?}", record);
            sink.write_all(&record.to_bytes())?;
        }

        // Pass 2: the payloads, at the offsets pass 1 handed out.
        for file in &self.files {
            let mut source = File::open(&file.source)
                .map_err(|e| PakError::SourceOpenFailed(file.source.clone(), e))?;

            debug!(
                "Writing {} as {} at offset {}",
                file.source.display(),
                file.name,
                file.offset
            );
            sink.seek(SeekFrom::Start(u64::from(file.offset)))?;
            let copied = io::copy(&mut io::Read::by_ref(&mut source).take(u64::from(file.size)), &mut sink)?;
            if copied != u64::from(file.size) {
                return Err(PakError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "{} shrank to {} of {} bytes",
                        file.source.display(),
                        copied,
                        file.size
                    ),
                )));
            }
        }

        sink.flush()?;
        Ok(())
    }
}
