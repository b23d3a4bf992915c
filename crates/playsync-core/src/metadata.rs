//! Track tag extraction.
//!
//! Filename rewriting needs artist, album, and title for each track. The
//! [`MetadataReader`] trait keeps the tag-decoding library behind a fixed
//! interface so tests can substitute canned tags; [`Id3TagReader`] is the
//! production implementation.

use std::path::Path;

use id3::{Tag, TagLike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Tags read from a single track.
///
/// Fields are empty strings when the tag is absent. `valid` is `false` when
/// the file's tags could not be decoded at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackTags {
    /// Artist name.
    pub artist: String,
    /// Album name.
    pub album: String,
    /// Track title.
    pub title: String,
    /// Whether the file's tags were decodable.
    pub valid: bool,
}

impl TrackTags {
    /// Tags for a file whose tag data could not be decoded.
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Name of the first required field that is empty or whitespace-only,
    /// if any. Rewriting requires all three.
    #[must_use]
    pub fn first_missing_field(&self) -> Option<&'static str> {
        if self.artist.trim().is_empty() {
            Some("artist")
        } else if self.album.trim().is_empty() {
            Some("album")
        } else if self.title.trim().is_empty() {
            Some("title")
        } else {
            None
        }
    }
}

/// Trait for reading track tags.
/// This trait allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataReader {
    /// Read the tags of a track.
    fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

/// Production tag reader backed by the `id3` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3TagReader;

impl Id3TagReader {
    /// Create a new tag reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetadataReader for Id3TagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        debug!("Reading tags from {}", path.display());

        let tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                debug!("No ID3 tag found in {}", path.display());
                return Ok(TrackTags {
                    valid: true,
                    ..TrackTags::default()
                });
            }
            Err(e) => {
                warn!("Failed to read tags from {}: {}", path.display(), e);
                return Ok(TrackTags::invalid());
            }
        };

        Ok(TrackTags {
            artist: tag.artist().unwrap_or_default().to_string(),
            album: tag.album().unwrap_or_default().to_string(),
            title: tag.title().unwrap_or_default().to_string(),
            valid: true,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_first_missing_field_order() {
        let tags = TrackTags {
            artist: String::new(),
            album: "Album".to_string(),
            title: "Title".to_string(),
            valid: true,
        };
        assert_eq!(tags.first_missing_field(), Some("artist"));

        let tags = TrackTags {
            artist: "Artist".to_string(),
            album: "   ".to_string(),
            title: "Title".to_string(),
            valid: true,
        };
        assert_eq!(tags.first_missing_field(), Some("album"));

        let tags = TrackTags {
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            title: "Title".to_string(),
            valid: true,
        };
        assert_eq!(tags.first_missing_field(), None);
    }

    #[test]
    fn test_read_tags_untagged_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.mp3");
        fs::write(&path, b"\xff\xfb\x90\x00not really audio").unwrap();

        // A file without an ID3 header yields empty but valid tags.
        let tags = Id3TagReader::new().read_tags(&path).unwrap();
        assert!(tags.valid);
        assert_eq!(tags.first_missing_field(), Some("artist"));
    }

    #[test]
    fn test_read_tags_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tagged.mp3");
        fs::write(&path, b"\xff\xfb\x90\x00payload").unwrap();

        let mut tag = Tag::new();
        tag.set_artist("Some Artist");
        tag.set_album("Some Album");
        tag.set_title("Some Title");
        tag.write_to_path(&path, id3::Version::Id3v24).unwrap();

        let tags = Id3TagReader::new().read_tags(&path).unwrap();
        assert!(tags.valid);
        assert_eq!(tags.artist, "Some Artist");
        assert_eq!(tags.album, "Some Album");
        assert_eq!(tags.title, "Some Title");
    }
}
