//! Filesystem capability interface.
//!
//! All destination mutations go through the [`FileSystem`] trait so the
//! orchestrator can be exercised against a mock in tests and so dry-run mode
//! has a single choke point to suppress. [`RealFileSystem`] is the
//! production implementation over `std::fs`.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{FileSystemError, Result};

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    /// Entry name (no path components).
    pub name: String,
    /// Whether the entry is a regular file.
    pub is_file: bool,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Trait for filesystem operations.
/// This trait allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// List the immediate entries of a directory, sorted by name.
    fn list_entries(&self, path: &Path) -> Result<Vec<FsEntry>>;

    /// Copy a file, overwriting the destination if it exists.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Move a file within the destination tree.
    fn move_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Delete a single file.
    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Create a directory (parents must already exist).
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether a path is a regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Production filesystem backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new real filesystem handle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn list_entries(&self, path: &Path) -> Result<Vec<FsEntry>> {
        if !path.is_dir() {
            return Err(FileSystemError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = entry.file_type();
            entries.push(FsEntry {
                name,
                is_file: file_type.is_file(),
                is_dir: file_type.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        debug!("Copying {} to {}", src.display(), dst.display());
        fs::copy(src, dst).map_err(|e| FileSystemError::CopyFailed {
            source_path: src.to_path_buf(),
            destination: dst.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<()> {
        debug!("Moving {} to {}", src.display(), dst.display());
        if fs::rename(src, dst).is_ok() {
            return Ok(());
        }

        // Rename can fail across filesystem boundaries; fall back to
        // copy-then-delete.
        fs::copy(src, dst).map_err(|e| FileSystemError::MoveFailed {
            source_path: src.to_path_buf(),
            destination: dst.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::remove_file(src).map_err(|e| FileSystemError::DeleteFailed {
            path: src.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        debug!("Deleting {}", path.display());
        fs::remove_file(path).map_err(|e| FileSystemError::DeleteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        debug!("Creating directory {}", path.display());
        fs::create_dir(path).map_err(|e| FileSystemError::CreateDirFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        debug!("Removing directory {}", path.display());
        fs::remove_dir(path).map_err(|e| FileSystemError::DeleteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
