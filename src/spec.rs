//! Code specific to the PAK file format.
//!
//! We try to keep the nitty gritty here,
//! and higher-level stuff in the [`read`] and [`write`] modules.
//!
//! The format comes from Quake's `pakfile.c` and is about as simple as
//! archive containers get: a 12-byte header pointing at a table of
//! fixed-width 64-byte records, each naming a span of the file.
//! All integers are little-endian.
//!
//! [`read`]: ../read/index.html
//! [`write`]: ../write/index.html

use std::convert::TryInto;

use camino::Utf8PathBuf;

use crate::result::*;

/// Magic tag at the front of every PAK archive
pub const MAGIC: [u8; 4] = *b"PACK";

/// Size of the fixed header: magic + directory offset + directory size
pub const HEADER_SIZE: usize = 12;

/// Size of the fixed name field in a directory record
pub const NAME_LENGTH: usize = 56;

/// Size of one directory record: name field + offset + size
pub const RECORD_SIZE: usize = NAME_LENGTH + 8;

/// Reads a little-endian u32 from the front of the provided slice, shrinking it.
fn read_u32(input: &mut &[u8]) -> u32 {
    let (int_bytes, rest) = input.split_at(std::mem::size_of::<u32>());
    *input = rest;
    u32::from_le_bytes(int_bytes.try_into().expect("less than four bytes for u32"))
}

/// The fixed header at the front of the archive
///
/// Nothing but the magic tag and the position and length
/// of the directory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub directory_offset: u32,
    pub directory_size: u32,
}

impl Header {
    /// Parses the header from the first [`HEADER_SIZE`] bytes of the archive.
    ///
    /// The caller guarantees `header` is at least that long.
    pub fn parse(mut header: &[u8]) -> PakResult<Self> {
        // Header layout:
        //
        // magic tag ("PACK")   4 bytes
        // directory offset     4 bytes
        // directory size       4 bytes
        if header[..4] != MAGIC {
            return Err(PakError::InvalidHeader("wrong magic tag"));
        }
        header = &header[4..];
        let directory_offset = read_u32(&mut header);
        let directory_size = read_u32(&mut header);

        Ok(Self {
            directory_offset,
            directory_size,
        })
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&self.directory_offset.to_le_bytes());
        bytes[8..].copy_from_slice(&self.directory_size.to_le_bytes());
        bytes
    }
}

/// Data from one directory record
///
/// Each record names one contiguous span of the archive.
#[derive(Debug)]
pub struct DirectoryRecord<'a> {
    pub name: &'a [u8],
    pub offset: u32,
    pub size: u32,
}

impl<'a> DirectoryRecord<'a> {
    /// Reads the next record off the front of the directory block.
    ///
    /// The caller guarantees `record` holds at least [`RECORD_SIZE`] bytes.
    pub fn parse_and_consume(record: &mut &'a [u8]) -> Self {
        // Record layout:
        //
        // name, NUL-padded     56 bytes
        // file offset          4 bytes
        // file size            4 bytes
        let (name, mut rest) = record.split_at(NAME_LENGTH);
        let offset = read_u32(&mut rest);
        let size = read_u32(&mut rest);
        *record = rest;

        Self { name, offset, size }
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[..self.name.len()].copy_from_slice(self.name);
        bytes[NAME_LENGTH..NAME_LENGTH + 4].copy_from_slice(&self.offset.to_le_bytes());
        bytes[NAME_LENGTH + 4..].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }
}

/// Packs a name into the fixed 56-byte field, NUL-padded.
///
/// A 56-byte name fills the field with no terminator,
/// matching what Quake's tools wrote.
pub fn pack_name(name: &str) -> PakResult<[u8; NAME_LENGTH]> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_LENGTH {
        return Err(PakError::NameTooLong(Utf8PathBuf::from(name)));
    }
    let mut field = [0u8; NAME_LENGTH];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

/// Unpacks a name from its fixed field, stopping at the first NUL.
///
/// PAK predates any notion of a declared text encoding,
/// so non-UTF-8 bytes are replaced rather than rejected.
pub fn unpack_name(field: &[u8]) -> Utf8PathBuf {
    let end = memchr::memchr(0, field).unwrap_or(field.len());
    Utf8PathBuf::from(String::from_utf8_lossy(&field[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = Header {
            directory_offset: 12,
            directory_size: 128,
        };
        let parsed = Header::parse(&header.to_bytes()).unwrap();
        assert_eq!(header, parsed);
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let mut bytes = Header {
            directory_offset: 12,
            directory_size: 0,
        }
        .to_bytes();
        bytes[..4].copy_from_slice(b"JUNK");
        assert!(matches!(
            Header::parse(&bytes),
            Err(PakError::InvalidHeader(_))
        ));
    }

    #[test]
    fn names_fill_the_field_but_no_further() {
        let exactly_56 = "a".repeat(56);
        let field = pack_name(&exactly_56).unwrap();
        assert_eq!(unpack_name(&field).as_str(), exactly_56);

        let too_long = "a".repeat(57);
        assert!(matches!(
            pack_name(&too_long),
            Err(PakError::NameTooLong(_))
        ));
    }

    #[test]
    fn embedded_nul_ends_the_name() {
        let mut field = pack_name("maps/e1m1.bsp").unwrap();
        field[4] = 0;
        assert_eq!(unpack_name(&field), Utf8PathBuf::from("maps"));
    }

    #[test]
    fn record_round_trips() {
        let name = pack_name("sound/misc/menu1.wav").unwrap();
        let record = DirectoryRecord {
            name: &name,
            offset: 140,
            size: 9001,
        };
        let bytes = record.to_bytes();
        let mut slice = &bytes[..];
        let parsed = DirectoryRecord::parse_and_consume(&mut slice);
        assert!(slice.is_empty());
        assert_eq!(unpack_name(parsed.name), "sound/misc/menu1.wav");
        assert_eq!(parsed.offset, 140);
        assert_eq!(parsed.size, 9001);
    }
}
