//! Error types for the playsync core library.
//!
//! Each domain has its own typed error enum; the top-level [`Error`] wraps
//! them so callers can match on the failure domain without losing detail.
//! Fatal precondition violations (duplicate names, reshuffle exhaustion)
//! surface before any filesystem mutation has happened.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for playsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for playsync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Raw I/O error that carries no additional context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem operation failure with path context.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Playlist reading failure.
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Metadata extraction failure.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Synchronization precondition or allocation failure.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by filesystem operations.
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Directory listing failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// The path that could not be read.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },

    /// File copy failed.
    #[error("Failed to copy {source_path} to {destination}: {reason}")]
    CopyFailed {
        /// Source of the copy.
        source_path: PathBuf,
        /// Intended destination.
        destination: PathBuf,
        /// Underlying failure description.
        reason: String,
    },

    /// File move failed.
    #[error("Failed to move {source_path} to {destination}: {reason}")]
    MoveFailed {
        /// Source of the move.
        source_path: PathBuf,
        /// Intended destination.
        destination: PathBuf,
        /// Underlying failure description.
        reason: String,
    },

    /// File or directory deletion failed.
    #[error("Failed to delete {path}: {reason}")]
    DeleteFailed {
        /// The path that could not be deleted.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },

    /// Directory creation failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },
}

/// Errors raised while reading playlists.
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The playlist file itself does not exist.
    #[error("Playlist not found: {path}")]
    NotFound {
        /// Path given on the command line.
        path: PathBuf,
    },

    /// The playlist file could not be read.
    #[error("Failed to read playlist {path}: {reason}")]
    Unreadable {
        /// The playlist path.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },
}

/// Errors raised during metadata-based filename rewriting.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A tag required for rewriting is empty or absent. Fatal for the whole
    /// run; a renamed-but-mistagged file would silently corrupt the diff.
    #[error("Missing {missing} tag in {path}")]
    MissingTags {
        /// File whose tags are incomplete.
        path: PathBuf,
        /// Name of the first missing tag field.
        missing: String,
    },

    /// The file's tags could not be decoded at all.
    #[error("Unreadable tags in {path}")]
    Invalid {
        /// File whose tags could not be decoded.
        path: PathBuf,
    },
}

/// Errors raised by the diff engine and the allocators.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Two playlist entries produced the same destination name. Guards a
    /// logic error in the filename normalizer.
    #[error("Duplicate computed filename: {name}")]
    DuplicatePlaylistName {
        /// The colliding name (case-folded).
        name: String,
    },

    /// Two destination files share a basename across folders. The tool
    /// cannot disambiguate such a destination.
    #[error("Duplicate filename on destination: {name}")]
    DuplicateDestinationName {
        /// The colliding basename (case-folded).
        name: String,
    },

    /// Reshuffle found no folder with a free slot for a file.
    #[error("All folders are full, no placement possible for {file}")]
    FoldersFull {
        /// The file that could not be placed.
        file: String,
    },

    /// A reshuffle move target already exists on disk.
    #[error("Move target already exists: {path}")]
    NameCollision {
        /// The occupied target path.
        path: PathBuf,
    },
}
