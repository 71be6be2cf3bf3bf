use std::fs;
use std::path::{Path, PathBuf};

use anyhow::*;
use std::result::Result::Ok;
use camino::Utf8PathBuf;
use log::*;
use structopt::*;
use walkdir::WalkDir;

use pakr::{PakArchive, PakBuilder};

#[derive(Debug, StructOpt)]
#[structopt(name = "paktool", about = "Lists, extracts, and creates PAK archives")]
struct Opt {
    /// Pass multiple times for additional verbosity (info, debug, trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbosity: usize,

    /// List files contained within the PAK file(s)
    #[structopt(short, long)]
    list: bool,

    /// Display additional details when listing contents of the archive
    #[structopt(short, long)]
    details: bool,

    /// Display basic info about the PAK file(s)
    #[structopt(short, long)]
    info: bool,

    /// Extract this PAK file
    #[structopt(short = "x", long)]
    extract: Option<PathBuf>,

    /// Create a PAK file with this name from the given directory
    #[structopt(short, long)]
    create: Option<PathBuf>,

    /// The output directory when extracting
    /// (defaults to the archive's name, minus its extension)
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// PAK files to list, or the directory to pack
    #[structopt(name = "files")]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    let mut errlog = stderrlog::new();
    errlog.verbosity(args.verbosity + 1);
    errlog.init()?;

    if let Some(pak_path) = &args.extract {
        let out_dir = match &args.output {
            Some(o) => o.clone(),
            None => pak_path.with_extension(""),
        };
        extract(pak_path, &out_dir)
    } else if let Some(pak_path) = &args.create {
        let source_dir = args
            .files
            .first()
            .context("No directory to pack was given")?;
        create(pak_path, source_dir)
    } else {
        for pak_path in &args.files {
            query(pak_path, &args)?;
        }
        Ok(())
    }
}

/// Dumps the given archive into `out_dir`.
///
/// Each entry's failure is independent; we report it and keep going.
fn extract(pak_path: &Path, out_dir: &Path) -> Result<()> {
    let mut archive = PakArchive::new();
    archive
        .open(pak_path)
        .with_context(|| format!("Unable to open archive {}", pak_path.display()))?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Couldn't create directory {}", out_dir.display()))?;

    // The borrow checker won't let us extract (which moves the archive's
    // file cursor) while iterating its directory, so snap the names up front.
    let names: Vec<Utf8PathBuf> = archive.entries().iter().map(|e| e.name.clone()).collect();

    for name in names {
        let destination = out_dir.join(name.as_std_path());

        // The archive doesn't create parent directories; that's on us.
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Couldn't create directory {}", parent.display()))?;
        }

        match archive.extract(&name, &destination) {
            Ok(()) => info!("{} -> {}", name, destination.display()),
            Err(e) => error!("Unable to extract {}: {}", name, e),
        }
    }
    Ok(())
}

/// Packs the contents of `source_dir` into a new archive at `pak_path`.
fn create(pak_path: &Path, source_dir: &Path) -> Result<()> {
    let mut builder = PakBuilder::new();

    for entry in WalkDir::new(source_dir) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        // Name files by their /-separated path relative to the packed root.
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .expect("walked path not under its root");
        let name = Utf8PathBuf::from_path_buf(relative.to_owned())
            .map_err(|p| anyhow!("Non-UTF-8 path {}", p.display()))?;

        info!("Added {} as {}", entry.path().display(), name);
        builder
            .add(entry.path(), &name)
            .with_context(|| format!("Couldn't add {}", entry.path().display()))?;
    }

    let file_count = builder.len();
    builder
        .write(pak_path)
        .with_context(|| format!("Failed to save archive '{}'", pak_path.display()))?;

    println!(
        "Wrote archive '{}' with {} files",
        pak_path.display(),
        file_count
    );
    Ok(())
}

/// Handles the read-only modes: `--info`, `--list`, and `--details`.
fn query(pak_path: &Path, args: &Opt) -> Result<()> {
    let mut archive = PakArchive::new();
    archive
        .open(pak_path)
        .with_context(|| format!("Unable to open archive {}", pak_path.display()))?;

    if args.info {
        println!("ID PAK archive, {} files", archive.file_count());
    }

    if args.list {
        for entry in archive.entries() {
            println!("{}", entry.name);
            if args.details {
                println!("  size:   {} ({} KiB)", entry.size, entry.size / 1024);
                println!("  offset: {:#X}", entry.offset);
            }
        }
    }
    Ok(())
}
