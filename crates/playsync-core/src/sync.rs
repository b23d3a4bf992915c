//! Synchronization orchestrator.
//!
//! Sequences one run: parse playlists, compute destination names, scan the
//! destination, diff, delete orphans (sync mode), shuffle, allocate, copy,
//! and optionally hand over to the reshuffle pass. The sequence is linear
//! with no branching back; every planned action goes through the
//! [`Reporter`] port, and dry-run mode gates only the filesystem mutations
//! so planning, precondition checks, and reporting are identical either way.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocate::{allocate_tracks, plan_reshuffle};
use crate::diff::compute_diff;
use crate::error::Result;
use crate::folders::{FolderIndex, FolderTemplate};
use crate::fs::FileSystem;
use crate::metadata::MetadataReader;
use crate::naming::assign_names;
use crate::playlist::parse_playlist;
use crate::report::{ReportEvent, Reporter};

/// How playlist-to-destination differences are acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Copy additions and delete destination files not on any playlist.
    Sync,
    /// Copy additions only; orphaned files are reported but kept.
    Append,
}

/// Options for one sync/append run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Sync or append behavior for orphaned destination files.
    pub mode: SyncMode,
    /// Plan and report everything, mutate nothing.
    pub dry_run: bool,
    /// Rewrite destination filenames from tags instead of keeping basenames.
    pub rewrite_names: bool,
    /// Randomize the order of additions before allocation. Only effective
    /// when folders are in use.
    pub shuffle: bool,
    /// Run the reshuffle pass after copying.
    pub reshuffle: bool,
    /// Maximum tracks per folder; 0 keeps everything in the destination
    /// root.
    pub tracks_per_folder: usize,
    /// Template for numbered folder names.
    pub folder_template: FolderTemplate,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::Sync,
            dry_run: false,
            rewrite_names: false,
            shuffle: true,
            reshuffle: false,
            tracks_per_folder: 0,
            folder_template: FolderTemplate::default(),
        }
    }
}

/// Counts describing a completed sync/append run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    /// Usable tracks across all parsed playlists.
    pub playlist_tracks: usize,
    /// Tracks already present on the destination.
    pub skipped_existing: usize,
    /// Tracks planned for copying.
    pub additions: usize,
    /// Destination files without a playlist counterpart.
    pub deletions_planned: usize,
    /// Files actually deleted (0 in append mode).
    pub deleted: usize,
    /// Tracks copied.
    pub copied: usize,
    /// Folders newly created.
    pub folders_created: usize,
    /// Emptied folders removed.
    pub folders_removed: usize,
    /// Files moved by the trailing reshuffle pass.
    pub moved: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Counts describing a completed reshuffle pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReshuffleReport {
    /// Files considered for redistribution.
    pub files: usize,
    /// Moves planned (and executed outside dry-run).
    pub moved: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Orchestrates sync, append, and reshuffle runs over the collaborator
/// ports.
pub struct SyncOrchestrator<'a> {
    fs: &'a dyn FileSystem,
    tags: &'a dyn MetadataReader,
    reporter: &'a mut dyn Reporter,
}

impl<'a> SyncOrchestrator<'a> {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        fs: &'a dyn FileSystem,
        tags: &'a dyn MetadataReader,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self { fs, tags, reporter }
    }

    /// Run a sync or append pass.
    ///
    /// # Errors
    ///
    /// Fails on unreadable playlists, missing tags during rewriting,
    /// duplicate-name preconditions, and filesystem failures. Fatal
    /// conditions abort before any mutation; filesystem failures mid-run
    /// leave partial results in place.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        destination: &Path,
        playlists: &[PathBuf],
        options: &SyncOptions,
        rng: &mut R,
    ) -> Result<SyncReport> {
        let mut report = SyncReport {
            dry_run: options.dry_run,
            ..SyncReport::default()
        };

        // PARSE
        let mut sources = Vec::new();
        for playlist in playlists {
            let tracks = parse_playlist(playlist)?;
            self.reporter.report(ReportEvent::PlaylistParsed {
                path: playlist.clone(),
                tracks: tracks.len(),
            });
            sources.extend(tracks);
        }
        report.playlist_tracks = sources.len();

        // REWRITE_NAMES
        let named = assign_names(&sources, options.rewrite_names, self.tags)?;

        // LIST_DESTINATION
        let single_folder = options.tracks_per_folder == 0;
        let mut index = FolderIndex::scan(
            self.fs,
            destination,
            &options.folder_template,
            single_folder,
        )?;

        // DIFF
        let diff = compute_diff(&named, &index)?;
        report.additions = diff.additions.len();
        report.deletions_planned = diff.deletions.len();
        report.skipped_existing = named.len() - diff.additions.len();
        self.reporter.report(ReportEvent::DiffComputed {
            additions: diff.additions.len(),
            deletions: diff.deletions.len(),
        });

        // DELETE (sync mode) / report-only (append mode)
        match options.mode {
            SyncMode::Sync => {
                let (deleted, removed) =
                    self.delete_orphans(&mut index, &diff.deletions, options.dry_run)?;
                report.deleted = deleted;
                report.folders_removed = removed;
            }
            SyncMode::Append => {
                if !diff.deletions.is_empty() {
                    self.reporter.report(ReportEvent::KeepOrphans {
                        count: diff.deletions.len(),
                    });
                }
            }
        }

        // SHUFFLE
        let mut additions = diff.additions;
        if options.shuffle && !single_folder {
            additions.shuffle(rng);
        }

        // ALLOCATE
        let plan = allocate_tracks(&mut index, additions, options.tracks_per_folder);
        report.folders_created = plan.created_folders.len();
        for number in &plan.created_folders {
            let path = index.folder_path(*number);
            self.reporter.report(ReportEvent::CreateFolder { path: path.clone() });
            if !options.dry_run {
                self.fs.create_dir(&path)?;
            }
        }

        // COPY
        for copy in &plan.copies {
            self.reporter.report(ReportEvent::CopyTrack {
                name: copy.track.name.clone(),
                destination: copy.destination.clone(),
            });
            if !options.dry_run {
                self.fs.copy_file(&copy.track.source, &copy.destination)?;
            }
        }
        report.copied = plan.copies.len();

        // RESHUFFLE (optional trailing pass)
        if options.reshuffle {
            let reshuffled = self.reshuffle(
                destination,
                &options.folder_template,
                options.dry_run,
                rng,
            )?;
            report.moved = reshuffled.moved;
        }

        info!(
            "Run complete: {} copied, {} deleted, {} moved{}",
            report.copied,
            report.deleted,
            report.moved,
            if report.dry_run { " (dry run)" } else { "" }
        );
        Ok(report)
    }

    /// Run an independent reshuffle pass: list, allocate, move.
    ///
    /// # Errors
    ///
    /// Fails when no valid placement exists for a file or when a planned
    /// move target is already occupied; in both cases zero moves have been
    /// executed.
    pub fn reshuffle<R: Rng + ?Sized>(
        &mut self,
        destination: &Path,
        template: &FolderTemplate,
        dry_run: bool,
        rng: &mut R,
    ) -> Result<ReshuffleReport> {
        let index = FolderIndex::scan(self.fs, destination, template, false)?;
        let moves = plan_reshuffle(&index, self.fs, rng)?;

        for mv in &moves {
            self.reporter.report(ReportEvent::MoveTrack {
                from: mv.from.clone(),
                to: mv.to.clone(),
            });
            if !dry_run && mv.from != mv.to {
                self.fs.move_file(&mv.from, &mv.to)?;
            }
        }

        Ok(ReshuffleReport {
            files: index.file_count(),
            moved: moves.len(),
            dry_run,
        })
    }

    /// Delete orphaned files and remove any folder emptied by a deletion.
    fn delete_orphans(
        &mut self,
        index: &mut FolderIndex,
        deletions: &[crate::folders::DestinationFile],
        dry_run: bool,
    ) -> Result<(usize, usize)> {
        let mut touched = Vec::new();
        for file in deletions {
            self.reporter.report(ReportEvent::DeleteTrack {
                path: file.path.clone(),
            });
            if !dry_run {
                self.fs.delete_file(&file.path)?;
            }
            index.record_deletion(file.folder);
            index.forget_file(&file.path);
            if !touched.contains(&file.folder) {
                touched.push(file.folder);
            }
        }

        // Only folders emptied by a deletion are removed, and never the
        // destination root in single-folder mode.
        let mut removed = 0;
        if !index.is_single_folder() {
            for folder in touched {
                if index.occupancy(folder) == 0 {
                    let path = index.folder_path(folder);
                    self.reporter
                        .report(ReportEvent::RemoveFolder { path: path.clone() });
                    if !dry_run {
                        self.fs.remove_dir(&path)?;
                    }
                    index.remove_folder(folder);
                    removed += 1;
                }
            }
        }

        Ok((deletions.len(), removed))
    }
}
