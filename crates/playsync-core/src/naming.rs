//! Destination filename computation.
//!
//! Each playlist track gets exactly one destination name per run: either its
//! original basename or a name rewritten from tags as
//! `"{artist} - {album} - {title}"`. The [`NameRegistry`] keeps every name
//! assigned so far and suffixes `" (2)"`, `" (3)"`, … until the case-folded
//! candidate is free, so repeated runs over the same ordered input always
//! produce the same names.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MetadataError, Result};
use crate::metadata::MetadataReader;

/// Characters allowed in rewritten names: word characters, whitespace,
/// parentheses, hyphen, period, apostrophe.
#[allow(clippy::expect_used)]
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s()\-.']").expect("valid pattern"));

/// A playlist track with its computed destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTrack {
    /// Position of the track in the merged playlist order.
    pub index: usize,
    /// Absolute path of the source file.
    pub source: PathBuf,
    /// Computed destination basename, unique within the run.
    pub name: String,
}

/// Registry of destination names assigned during one run.
///
/// Holds the ordered list of assigned names plus a case-folded set for O(1)
/// collision lookup.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl NameRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name built from `stem` and `ext`, suffixing `" (n)"`
    /// before the extension until the case-folded result is unused.
    pub fn register(&mut self, stem: &str, ext: &str) -> String {
        let mut attempt: u32 = 1;
        loop {
            let candidate = if attempt > 1 {
                format!("{stem} ({attempt}){ext}")
            } else {
                format!("{stem}{ext}")
            };
            let key = candidate.to_lowercase();
            if !self.seen.contains(&key) {
                self.seen.insert(key);
                self.names.push(candidate.clone());
                return candidate;
            }
            attempt += 1;
        }
    }

    /// All names assigned so far, in assignment order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of assigned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name has been assigned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Strip disallowed characters from a rewritten name and trim whitespace.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    DISALLOWED_CHARS.replace_all(raw, "").trim().to_string()
}

/// Compute destination names for an ordered list of source tracks.
///
/// With `rewrite` disabled the original basename is used; with it enabled
/// the name is composed from the track's tags. Either way the registry's
/// collision suffixing guarantees uniqueness across the run.
///
/// # Errors
///
/// With `rewrite` enabled, fails when a track's tags cannot be decoded or
/// when artist, album, or title is empty. The whole run stops; a
/// renamed-but-mistagged file would silently corrupt the diff.
pub fn assign_names(
    sources: &[PathBuf],
    rewrite: bool,
    reader: &dyn MetadataReader,
) -> Result<Vec<NamedTrack>> {
    let mut registry = NameRegistry::new();
    let mut tracks = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        let ext = extension_of(source);
        let stem = if rewrite {
            rewritten_stem(source, reader)?
        } else {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        let name = registry.register(&stem, &ext);
        tracks.push(NamedTrack {
            index,
            source: source.clone(),
            name,
        });
    }

    Ok(tracks)
}

/// Build the tag-based stem for one track.
fn rewritten_stem(source: &Path, reader: &dyn MetadataReader) -> Result<String> {
    let tags = reader.read_tags(source)?;
    if !tags.valid {
        return Err(MetadataError::Invalid {
            path: source.to_path_buf(),
        }
        .into());
    }
    if let Some(missing) = tags.first_missing_field() {
        return Err(MetadataError::MissingTags {
            path: source.to_path_buf(),
            missing: missing.to_string(),
        }
        .into());
    }
    Ok(sanitize_name(&format!(
        "{} - {} - {}",
        tags.artist, tags.album, tags.title
    )))
}

/// Extension of a path including the leading dot, preserved as-is.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::{MockMetadataReader, TrackTags};

    fn reader_with(artist: &str, album: &str, title: &str) -> MockMetadataReader {
        let (artist, album, title) = (artist.to_string(), album.to_string(), title.to_string());
        let mut reader = MockMetadataReader::new();
        reader.expect_read_tags().returning(move |_| {
            Ok(TrackTags {
                artist: artist.clone(),
                album: album.clone(),
                title: title.clone(),
                valid: true,
            })
        });
        reader
    }

    #[test]
    fn test_sanitize_strips_disallowed_characters() {
        assert_eq!(
            sanitize_name("AC/DC - Back in Black - Hells Bells!?"),
            "ACDC - Back in Black - Hells Bells"
        );
        assert_eq!(sanitize_name("  What's Going On (Live)  "), "What's Going On (Live)");
    }

    #[test]
    fn test_registry_collision_suffixing() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("Song", ".mp3"), "Song.mp3");
        assert_eq!(registry.register("Song", ".mp3"), "Song (2).mp3");
        assert_eq!(registry.register("Song", ".mp3"), "Song (3).mp3");
        // Different extension is a different name.
        assert_eq!(registry.register("Song", ".wav"), "Song.wav");
    }

    #[test]
    fn test_registry_collision_is_case_insensitive() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("Song", ".mp3"), "Song.mp3");
        assert_eq!(registry.register("SONG", ".MP3"), "SONG (2).MP3");
    }

    #[test]
    fn test_assign_names_without_rewrite_keeps_basenames() {
        let reader = MockMetadataReader::new();
        let sources = vec![
            PathBuf::from("/music/One.mp3"),
            PathBuf::from("/other/Two.m4a"),
        ];
        let tracks = assign_names(&sources, false, &reader).unwrap();
        assert_eq!(tracks[0].name, "One.mp3");
        assert_eq!(tracks[1].name, "Two.m4a");
        assert_eq!(tracks[0].index, 0);
        assert_eq!(tracks[1].index, 1);
    }

    #[test]
    fn test_assign_names_rewrites_from_tags() {
        let reader = reader_with("Artist", "Album", "Title");
        let sources = vec![PathBuf::from("/music/x.mp3")];
        let tracks = assign_names(&sources, true, &reader).unwrap();
        assert_eq!(tracks[0].name, "Artist - Album - Title.mp3");
    }

    #[test]
    fn test_assign_names_is_deterministic() {
        let sources = vec![
            PathBuf::from("/music/a.mp3"),
            PathBuf::from("/music/a copy.mp3"),
        ];
        let first = assign_names(&sources, true, &reader_with("A", "B", "C")).unwrap();
        let second = assign_names(&sources, true, &reader_with("A", "B", "C")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "A - B - C.mp3");
        assert_eq!(first[1].name, "A - B - C (2).mp3");
    }

    #[test]
    fn test_assign_names_missing_tag_is_fatal() {
        let reader = reader_with("Artist", "", "Title");
        let sources = vec![PathBuf::from("/music/x.mp3")];
        let result = assign_names(&sources, true, &reader);
        assert!(matches!(
            result,
            Err(crate::error::Error::Metadata(
                MetadataError::MissingTags { .. }
            ))
        ));
    }

    #[test]
    fn test_assign_names_invalid_tags_are_fatal() {
        let mut reader = MockMetadataReader::new();
        reader
            .expect_read_tags()
            .returning(|_| Ok(TrackTags::invalid()));
        let sources = vec![PathBuf::from("/music/x.mp3")];
        let result = assign_names(&sources, true, &reader);
        assert!(matches!(
            result,
            Err(crate::error::Error::Metadata(MetadataError::Invalid { .. }))
        ));
    }
}
