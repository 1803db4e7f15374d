//! Local snapshot operations: copy a source tree into a fresh temp directory,
//! enumerate its files, and remove it again after the upload.
//!
//! All functions here are synchronous filesystem work; the orchestrator calls
//! them around the async upload step.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BackupError, BackupResult};

/// One regular file inside a snapshot, addressed both absolutely and relative
/// to the snapshot root. Generated once per run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path on the local filesystem.
    pub local_path: PathBuf,
    /// Path relative to the snapshot root; becomes the object key suffix.
    pub relative_path: PathBuf,
}

/// Copies the whole `source` tree (empty subdirectories included) under
/// `<temp_dir>/<source_folder_name>` and returns that destination path.
///
/// A fresh temp directory is created when none is given. The destination must
/// not already exist; there are no merge semantics. I/O and permission errors
/// propagate.
pub fn copy_folder(source: &Path, temp_dir: Option<&Path>) -> BackupResult<PathBuf> {
    if !source.exists() {
        return Err(BackupError::not_found(source));
    }
    if !source.is_dir() {
        return Err(BackupError::config(
            "source_folder",
            format!("not a directory: {}", source.display()),
        ));
    }

    let temp_dir = match temp_dir {
        Some(dir) => dir.to_path_buf(),
        None => tempfile::Builder::new()
            .prefix("bucket-backup-")
            .tempdir()
            .map_err(|e| BackupError::io("create temp directory", "<tempdir>", e))?
            .keep(),
    };

    let folder_name = source
        .file_name()
        .ok_or_else(|| {
            BackupError::config("source_folder", format!("no folder name: {}", source.display()))
        })?
        .to_owned();
    let destination = temp_dir.join(folder_name);

    info!(
        source = %source.display(),
        destination = %destination.display(),
        "copying source tree to snapshot"
    );

    // create_dir (not create_dir_all) rejects a pre-existing destination.
    fs::create_dir(&destination)
        .map_err(|e| BackupError::io("create snapshot directory", &destination, e))?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| BackupError::walk(source, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walked path is below its root");
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| BackupError::io("create directory", &target, e))?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|e| BackupError::io("copy file", entry.path(), e))?;
        }
    }

    info!("local copy complete");
    Ok(destination)
}

/// Walks `folder` and returns every regular file as a [`FileEntry`].
/// Traversal order is whatever the filesystem yields; nothing is filtered.
pub fn get_files_to_upload(folder: &Path) -> BackupResult<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|e| BackupError::walk(folder, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(folder)
            .expect("walked path is below its root")
            .to_path_buf();
        entries.push(FileEntry {
            local_path: entry.path().to_path_buf(),
            relative_path: relative,
        });
    }
    info!(count = entries.len(), folder = %folder.display(), "enumerated files to upload");
    Ok(entries)
}

/// Sums the byte length of every regular file under `folder`.
pub fn get_folder_size(folder: &Path) -> BackupResult<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|e| BackupError::walk(folder, e))?;
        if entry.file_type().is_file() {
            let metadata = entry
                .metadata()
                .map_err(|e| BackupError::walk(folder, e))?;
            total += metadata.len();
        }
    }
    Ok(total)
}

/// Formats a byte count with the largest unit keeping the value below 1024.
/// Presentational only, used for the size log line.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

/// Removes the temp directory that [`copy_folder`] created, i.e. the *parent*
/// of the snapshot path it returned. Propagates I/O errors; the caller decides
/// whether that is fatal.
pub fn cleanup_temp(temp_path: &Path) -> BackupResult<()> {
    let temp_dir = temp_path.parent().ok_or_else(|| {
        BackupError::config(
            "temp_path",
            format!("has no parent directory: {}", temp_path.display()),
        )
    })?;
    debug!(temp_dir = %temp_dir.display(), "removing temporary snapshot");
    fs::remove_dir_all(temp_dir)
        .map_err(|e| BackupError::io("remove temp directory", temp_dir, e))?;
    info!("temporary snapshot removed");
    Ok(())
}
