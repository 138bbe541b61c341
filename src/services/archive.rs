use crate::error::{Result, TransferError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const ARCHIVE_EXTENSION: &str = "zip";

/// Zip64 kicks in past this size
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub is_dir: bool,
}

/// `name` with `.zip` appended, keeping any extension `name` already has
/// (`notes.txt` becomes `notes.txt.zip`).
pub fn archive_path_for(name: impl AsRef<Path>) -> PathBuf {
    let mut path = name.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(ARCHIVE_EXTENSION);
    PathBuf::from(path)
}

pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == ARCHIVE_EXTENSION)
}

/// Packs `source_path` into `<archive_name>.zip` and returns that path.
///
/// A directory is walked recursively and each file is stored under its path
/// relative to `source_path`. A single file is stored under its base name.
pub fn pack(source_path: &Path, archive_name: impl AsRef<Path>) -> Result<PathBuf> {
    if !source_path.exists() {
        return Err(TransferError::NotFound(source_path.to_path_buf()));
    }

    let archive_path = archive_path_for(archive_name);
    if let Err(e) = write_archive(source_path, &archive_path) {
        // Never leave a truncated archive behind
        if let Err(rm) = std::fs::remove_file(&archive_path) {
            tracing::debug!(
                "Could not remove partial archive {}: {}",
                archive_path.display(),
                rm
            );
        }
        return Err(e);
    }

    tracing::debug!(
        "Packed {} into {}",
        source_path.display(),
        archive_path.display()
    );
    Ok(archive_path)
}

fn write_archive(source_path: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    if source_path.is_dir() {
        let archive_abs = archive_path.canonicalize()?;

        for entry in WalkDir::new(source_path)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            // The archive may live inside the tree it is packing
            if entry.file_name() == archive_abs.file_name().unwrap_or_default()
                && entry.path().canonicalize()? == archive_abs
            {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source_path)
                .map_err(|_| TransferError::InvalidName(entry.path().display().to_string()))?;
            add_file(&mut zip, entry.path(), &entry_name(relative))?;
        }
    } else {
        let name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TransferError::InvalidName(source_path.display().to_string()))?;
        add_file(&mut zip, source_path, &name)?;
    }

    zip.finish()?.flush()?;
    Ok(())
}

/// Extracts every entry of `archive_path` into `dest_dir`, creating
/// subdirectories as needed.
pub fn unpack(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    std::fs::create_dir_all(dest_dir)?;
    archive.extract(dest_dir)?;

    tracing::debug!(
        "Unpacked {} entries from {} into {}",
        archive.len(),
        archive_path.display(),
        dest_dir.display()
    );
    Ok(())
}

pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            size: file.size(),
            compressed_size: file.compressed_size(),
            is_dir: file.is_dir(),
        });
    }

    Ok(entries)
}

fn add_file<W: Write + Seek>(zip: &mut ZipWriter<W>, path: &Path, name: &str) -> Result<()> {
    let size = std::fs::metadata(path)?.len();
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= LARGE_FILE_THRESHOLD);

    tracing::debug!("Adding entry {} ({} bytes)", name, size);
    zip.start_file(name, options)?;
    let mut reader = BufReader::new(File::open(path)?);
    std::io::copy(&mut reader, zip)?;
    Ok(())
}

/// Entry names always use `/`, whatever the host separator is.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
