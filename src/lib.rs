//! pakr reads and writes PAK archives,
//! the container format id Software used for Quake's game data:
//! a flat directory of names, offsets, and sizes
//! in front of concatenated file payloads.
//!
//! Reading is handle-based — open an archive,
//! and its directory is loaded into memory for cheap lookups:
//!
//! ```no_run
//! # use pakr::*;
//! let mut archive = PakArchive::new();
//! archive.open("pak0.pak")?;
//!
//! // Iterate the directory in on-disk order...
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//!
//! // ...look files up by name...
//! let stat = archive.stat("sound/misc/menu1.wav")?;
//!
//! // ...and pull their contents out.
//! let mut contents = vec![0; stat.size as usize];
//! archive.read("sound/misc/menu1.wav", &mut contents)?;
//! archive.extract("gfx/palette.lmp", "palette.lmp")?;
//! # Ok::<(), pakr::PakError>(())
//! ```
//!
//! Writing is a two-pass affair: queue up files,
//! then lay the whole archive out at once.
//!
//! ```no_run
//! # use pakr::*;
//! let mut builder = PakBuilder::new();
//! builder.add("assets/e1m1.bsp", "maps/e1m1.bsp")?;
//! builder.write("pak0.pak")?;
//! # Ok::<(), pakr::PakError>(())
//! ```
//!
//! PAK stores files raw — no compression, no checksums, no timestamps —
//! which keeps the format (and this crate) small.

pub mod read;
pub mod result;
pub mod write;

pub use read::{Entry, FileStat, PakArchive};
pub use result::{PakError, PakResult};
pub use write::PakBuilder;

mod spec;
