//! `Playsync` Core Library
//!
//! This crate provides the core functionality for the `playsync` tool:
//! - M3U/M3U8 playlist reading
//! - Tag-based destination filename rewriting with collision suffixing
//! - Playlist-to-destination diffing by case-folded filename
//! - Capacity-bounded folder allocation for devices with folder limits
//! - Randomized reshuffling of existing destination contents
//! - Destination statistics
//!
//! # Error Handling
//!
//! This crate uses typed errors per domain. See the [`error`] module for
//! details. Fatal preconditions (duplicate names, impossible reshuffle
//! placements) abort a run before any filesystem mutation.
//!
//! ```rust,ignore
//! use playsync_core::{Error, Result};
//!
//! fn do_something() -> Result<()> {
//!     // Your code here
//!     Ok(())
//! }
//! ```

pub mod allocate;
pub mod diff;
pub mod error;
pub mod folders;
pub mod fs;
pub mod metadata;
pub mod naming;
pub mod playlist;
pub mod report;
pub mod stats;
pub mod sync;

pub use allocate::{AllocationPlan, PlannedCopy, PlannedMove, allocate_tracks, plan_reshuffle};
pub use diff::{Diff, compute_diff};
pub use error::{Error, FileSystemError, MetadataError, PlaylistError, Result, SyncError};
pub use folders::{DestinationFile, FolderIndex, FolderTemplate};
pub use fs::{FileSystem, FsEntry, RealFileSystem};
pub use metadata::{Id3TagReader, MetadataReader, TrackTags};
pub use naming::{NameRegistry, NamedTrack, assign_names, sanitize_name};
pub use playlist::{SUPPORTED_AUDIO_EXTENSIONS, is_supported_track, parse_playlist};
pub use report::{ConsoleReporter, MemoryReporter, ReportEvent, Reporter};
pub use stats::{GroupBy, StatsReport, StatsRow, collect_stats};
pub use sync::{ReshuffleReport, SyncMode, SyncOptions, SyncOrchestrator, SyncReport};
