//! Destination statistics.
//!
//! Counts the audio files already on a destination, grouped by artist tag
//! or by track. Purely informational; nothing is mutated.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::folders::FolderTemplate;
use crate::fs::FileSystem;
use crate::metadata::MetadataReader;
use crate::playlist::is_supported_track;

/// Label used when a file's tags are unreadable or empty.
const UNKNOWN: &str = "<unknown>";

/// Grouping key for destination statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Group by artist tag.
    Artist,
    /// Group by artist and title.
    Track,
}

/// One row of the statistics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Group label.
    pub name: String,
    /// Number of files in the group.
    pub count: usize,
}

/// Statistics over a destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    /// The grouping that produced the rows.
    pub group_by: GroupBy,
    /// Total audio files considered.
    pub total_files: usize,
    /// Rows sorted by descending count, then name.
    pub rows: Vec<StatsRow>,
}

/// Collect statistics for a destination.
///
/// Audio files in the destination root and in folders matching the template
/// are considered; other directories are ignored, matching the
/// synchronization engine's view of the destination.
///
/// # Errors
///
/// Returns an error if a directory listing fails.
pub fn collect_stats(
    fs: &dyn FileSystem,
    tags: &dyn MetadataReader,
    destination: &Path,
    template: &FolderTemplate,
    group_by: GroupBy,
) -> Result<StatsReport> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total_files = 0;

    for entry in fs.list_entries(destination)? {
        if entry.is_file {
            let path = destination.join(&entry.name);
            if is_supported_track(&path) {
                total_files += 1;
                *counts.entry(group_label(tags, &path, group_by)).or_insert(0) += 1;
            }
        } else if entry.is_dir && template.parse(&entry.name).is_some() {
            let folder = destination.join(&entry.name);
            for sub in fs.list_entries(&folder)? {
                if !sub.is_file {
                    continue;
                }
                let path = folder.join(&sub.name);
                if is_supported_track(&path) {
                    total_files += 1;
                    *counts.entry(group_label(tags, &path, group_by)).or_insert(0) += 1;
                }
            }
        }
    }

    let mut rows: Vec<StatsRow> = counts
        .into_iter()
        .map(|(name, count)| StatsRow { name, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    debug!("Collected stats over {total_files} files, {} groups", rows.len());
    Ok(StatsReport {
        group_by,
        total_files,
        rows,
    })
}

/// Compute the group label for one file.
fn group_label(tags: &dyn MetadataReader, path: &Path, group_by: GroupBy) -> String {
    let read = tags.read_tags(path).unwrap_or_default();
    let artist = non_empty(&read.artist);
    match group_by {
        GroupBy::Artist => artist.to_string(),
        GroupBy::Track => format!("{} - {}", artist, non_empty(&read.title)),
    }
}

/// Fall back to the unknown label for empty tag values.
fn non_empty(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { UNKNOWN } else { trimmed }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use crate::metadata::{MockMetadataReader, TrackTags};
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn reader_by_filename() -> MockMetadataReader {
        let mut reader = MockMetadataReader::new();
        reader.expect_read_tags().returning(|path| {
            let stem = path.file_stem().unwrap().to_string_lossy();
            let mut parts = stem.splitn(2, '_');
            Ok(TrackTags {
                artist: parts.next().unwrap_or_default().to_string(),
                album: String::new(),
                title: parts.next().unwrap_or_default().to_string(),
                valid: true,
            })
        });
        reader
    }

    #[test]
    fn test_stats_by_artist_sorted_by_count() {
        let temp = TempDir::new().unwrap();
        stdfs::create_dir(temp.path().join("Folder 1")).unwrap();
        stdfs::write(temp.path().join("Folder 1").join("abba_one.mp3"), b"1").unwrap();
        stdfs::write(temp.path().join("Folder 1").join("abba_two.mp3"), b"2").unwrap();
        stdfs::write(temp.path().join("zz_solo.mp3"), b"3").unwrap();
        // Non-audio and unmatched directories are ignored.
        stdfs::write(temp.path().join("notes.txt"), b"t").unwrap();
        stdfs::create_dir(temp.path().join("Covers")).unwrap();
        stdfs::write(temp.path().join("Covers").join("x_y.mp3"), b"4").unwrap();

        let report = collect_stats(
            &RealFileSystem::new(),
            &reader_by_filename(),
            temp.path(),
            &FolderTemplate::default(),
            GroupBy::Artist,
        )
        .unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].name, "abba");
        assert_eq!(report.rows[0].count, 2);
        assert_eq!(report.rows[1].name, "zz");
    }

    #[test]
    fn test_stats_by_track_uses_artist_and_title() {
        let temp = TempDir::new().unwrap();
        stdfs::write(temp.path().join("abba_waterloo.mp3"), b"1").unwrap();

        let report = collect_stats(
            &RealFileSystem::new(),
            &reader_by_filename(),
            temp.path(),
            &FolderTemplate::default(),
            GroupBy::Track,
        )
        .unwrap();

        assert_eq!(report.rows[0].name, "abba - waterloo");
    }

    #[test]
    fn test_stats_unreadable_tags_group_as_unknown() {
        let temp = TempDir::new().unwrap();
        stdfs::write(temp.path().join("a.mp3"), b"1").unwrap();

        let mut reader = MockMetadataReader::new();
        reader
            .expect_read_tags()
            .returning(|_| Ok(TrackTags::invalid()));
        let report = collect_stats(
            &RealFileSystem::new(),
            &reader,
            temp.path(),
            &FolderTemplate::default(),
            GroupBy::Artist,
        )
        .unwrap();

        assert_eq!(report.rows[0].name, UNKNOWN);
    }
}
