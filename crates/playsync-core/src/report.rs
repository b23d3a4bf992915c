//! Run reporting port.
//!
//! The orchestrator emits typed [`ReportEvent`]s for every planned action
//! instead of printing directly. The console implementation renders them for
//! humans; [`MemoryReporter`] records them so embedders and tests can assert
//! that a dry run plans exactly what a real run would.

use std::fmt;
use std::path::PathBuf;

/// A single planned or performed action in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A playlist was parsed into this many tracks.
    PlaylistParsed {
        /// Playlist path.
        path: PathBuf,
        /// Number of usable tracks found.
        tracks: usize,
    },
    /// The diff against the destination was computed.
    DiffComputed {
        /// Tracks to copy.
        additions: usize,
        /// Destination files without a playlist counterpart.
        deletions: usize,
    },
    /// A numbered folder will be created.
    CreateFolder {
        /// Folder path.
        path: PathBuf,
    },
    /// An emptied folder will be removed.
    RemoveFolder {
        /// Folder path.
        path: PathBuf,
    },
    /// A track will be copied onto the destination.
    CopyTrack {
        /// Computed destination basename.
        name: String,
        /// Full destination path.
        destination: PathBuf,
    },
    /// A destination file will be deleted.
    DeleteTrack {
        /// Full path of the file.
        path: PathBuf,
    },
    /// Deletions were computed but not acted upon (append mode).
    KeepOrphans {
        /// Number of files left in place.
        count: usize,
    },
    /// A destination file will be moved between folders.
    MoveTrack {
        /// Current path.
        from: PathBuf,
        /// Planned path.
        to: PathBuf,
    },
}

impl fmt::Display for ReportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaylistParsed { path, tracks } => {
                write!(f, "parsed {} ({} tracks)", path.display(), tracks)
            }
            Self::DiffComputed {
                additions,
                deletions,
            } => write!(f, "{additions} to copy, {deletions} to delete"),
            Self::CreateFolder { path } => write!(f, "mkdir {}", path.display()),
            Self::RemoveFolder { path } => write!(f, "rmdir {}", path.display()),
            Self::CopyTrack { name, destination } => {
                write!(f, "copy {} -> {}", name, destination.display())
            }
            Self::DeleteTrack { path } => write!(f, "delete {}", path.display()),
            Self::KeepOrphans { count } => {
                write!(f, "keeping {count} files not on any playlist")
            }
            Self::MoveTrack { from, to } => {
                write!(f, "move {} -> {}", from.display(), to.display())
            }
        }
    }
}

/// Port receiving run events.
pub trait Reporter {
    /// Handle one event.
    fn report(&mut self, event: ReportEvent);
}

/// Reporter printing one human-readable line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    /// Create a console reporter. With `quiet` set, nothing is printed.
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: ReportEvent) {
        if !self.quiet {
            println!("{event}");
        }
    }
}

/// Reporter recording every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    events: Vec<ReportEvent>,
}

impl MemoryReporter {
    /// Create an empty recording reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, in emission order.
    #[must_use]
    pub fn events(&self) -> &[ReportEvent] {
        &self.events
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, event: ReportEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_event_display() {
        let event = ReportEvent::CopyTrack {
            name: "song.mp3".to_string(),
            destination: Path::new("/dst/Folder 1/song.mp3").to_path_buf(),
        };
        assert_eq!(event.to_string(), "copy song.mp3 -> /dst/Folder 1/song.mp3");
    }

    #[test]
    fn test_memory_reporter_records_in_order() {
        let mut reporter = MemoryReporter::new();
        reporter.report(ReportEvent::DiffComputed {
            additions: 2,
            deletions: 0,
        });
        reporter.report(ReportEvent::KeepOrphans { count: 1 });
        assert_eq!(reporter.events().len(), 2);
        assert!(matches!(
            reporter.events()[0],
            ReportEvent::DiffComputed { additions: 2, .. }
        ));
    }
}
