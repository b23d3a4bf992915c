//! Playlist-to-destination diffing.
//!
//! Partition the computed playlist names and the current destination files
//! into additions (to copy) and deletions (to remove in sync mode), by
//! case-folded filename. Pure function of its inputs; mutation happens later
//! in the orchestrator.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, SyncError};
use crate::folders::{DestinationFile, FolderIndex};
use crate::naming::NamedTrack;

/// Outcome of diffing the merged playlists against the destination.
#[derive(Debug, Clone, Default)]
pub struct Diff {
    /// Playlist tracks absent from the destination, in playlist order.
    pub additions: Vec<NamedTrack>,
    /// Destination files absent from the playlists, in listing order.
    pub deletions: Vec<DestinationFile>,
}

impl Diff {
    /// Whether the destination already matches the playlists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }
}

/// Compute the diff between computed playlist names and the destination.
///
/// # Errors
///
/// Fails before any comparison when the computed names are not unique under
/// case folding (a normalizer logic error) or when two destination files
/// share a case-folded basename across folders (an inconsistent destination
/// the tool cannot disambiguate). Both are fatal; nothing has been mutated
/// at this point.
pub fn compute_diff(tracks: &[NamedTrack], index: &FolderIndex) -> Result<Diff> {
    let playlist_names = unique_playlist_names(tracks)?;
    let destination_names = unique_destination_names(index)?;

    let additions: Vec<NamedTrack> = tracks
        .iter()
        .filter(|t| !destination_names.contains(&t.name.to_lowercase()))
        .cloned()
        .collect();

    let deletions: Vec<DestinationFile> = index
        .files()
        .iter()
        .filter(|f| !playlist_names.contains(&f.name.to_lowercase()))
        .cloned()
        .collect();

    debug!(
        "Diff: {} additions, {} deletions, {} unchanged",
        additions.len(),
        deletions.len(),
        tracks.len() - additions.len()
    );

    Ok(Diff {
        additions,
        deletions,
    })
}

/// Collect case-folded playlist names, failing on duplicates.
fn unique_playlist_names(tracks: &[NamedTrack]) -> Result<HashSet<String>> {
    let mut names = HashSet::with_capacity(tracks.len());
    for track in tracks {
        let key = track.name.to_lowercase();
        if !names.insert(key.clone()) {
            return Err(SyncError::DuplicatePlaylistName { name: key }.into());
        }
    }
    Ok(names)
}

/// Collect case-folded destination basenames, failing on duplicates.
fn unique_destination_names(index: &FolderIndex) -> Result<HashSet<String>> {
    let mut names = HashSet::with_capacity(index.file_count());
    for file in index.files() {
        let key = file.name.to_lowercase();
        if !names.insert(key.clone()) {
            return Err(SyncError::DuplicateDestinationName { name: key }.into());
        }
    }
    Ok(names)
}
