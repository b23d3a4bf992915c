//! M3U/M3U8 playlist reading.
//!
//! A playlist is a text file listing one track path per line, usually
//! relative to the playlist's own directory. Lines starting with `#` are
//! directives or comments. Entries that do not resolve to a regular file
//! with a supported audio extension are skipped with a warning; that is the
//! single recoverable failure in a run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PlaylistError, Result};

/// Audio extensions accepted from playlists (typical head-unit support).
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav"];

/// UTF-8 byte-order mark.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Check if a path has a supported audio extension.
#[must_use]
pub fn is_supported_track(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Parse a playlist into an ordered list of absolute track paths.
///
/// Relative entries are resolved against the playlist's directory. Comment
/// lines, blank lines, missing files, and unsupported file types are
/// skipped; the latter two with a warning.
///
/// # Errors
///
/// Returns an error if the playlist itself does not exist or cannot be read.
pub fn parse_playlist(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_file() {
        return Err(PlaylistError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let raw = fs::read(path).map_err(|e| PlaylistError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let text = decode_lossy(&raw);

    let base = fs::canonicalize(path)
        .map_err(|e| PlaylistError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut tracks = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let resolved = base.join(line);
        if !resolved.is_file() {
            warn!("Skipping missing file {}", resolved.display());
            continue;
        }
        if !is_supported_track(&resolved) {
            warn!("Skipping unsupported file type {}", resolved.display());
            continue;
        }
        tracks.push(resolved);
    }

    debug!("Parsed {} tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Decode playlist bytes, stripping a UTF-8 BOM and replacing any invalid
/// sequences rather than failing on legacy encodings.
fn decode_lossy(raw: &[u8]) -> String {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_tracks(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"audio").unwrap();
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let temp = TempDir::new().unwrap();
        write_tracks(temp.path(), &["a.mp3", "b.mp3"]);
        let playlist = temp.path().join("mix.m3u");
        fs::write(&playlist, "#EXTM3U\n\na.mp3\n#EXTINF:123,Song\nb.mp3\n").unwrap();

        let tracks = parse_playlist(&playlist).unwrap();
        let names: Vec<_> = tracks
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_parse_resolves_relative_to_playlist_dir() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("tracks");
        fs::create_dir(&sub).unwrap();
        write_tracks(&sub, &["deep.mp3"]);
        let playlist = temp.path().join("mix.m3u");
        fs::write(&playlist, "tracks/deep.mp3\n").unwrap();

        let tracks = parse_playlist(&playlist).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].is_file());
        assert!(tracks[0].ends_with("tracks/deep.mp3"));
    }

    #[test]
    fn test_parse_skips_missing_and_unsupported_files() {
        let temp = TempDir::new().unwrap();
        write_tracks(temp.path(), &["ok.mp3", "cover.jpg"]);
        let playlist = temp.path().join("mix.m3u");
        fs::write(&playlist, "ok.mp3\ngone.mp3\ncover.jpg\n").unwrap();

        let tracks = parse_playlist(&playlist).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].ends_with("ok.mp3"));
    }

    #[test]
    fn test_parse_strips_utf8_bom_and_crlf() {
        let temp = TempDir::new().unwrap();
        write_tracks(temp.path(), &["a.mp3"]);
        let playlist = temp.path().join("mix.m3u");
        let mut content = Vec::new();
        content.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        content.extend_from_slice(b"a.mp3\r\n");
        fs::write(&playlist, content).unwrap();

        let tracks = parse_playlist(&playlist).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].ends_with("a.mp3"));
    }

    #[test]
    fn test_parse_missing_playlist_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = parse_playlist(&temp.path().join("gone.m3u"));
        assert!(matches!(
            result,
            Err(crate::error::Error::Playlist(PlaylistError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_is_supported_track() {
        assert!(is_supported_track(Path::new("x.mp3")));
        assert!(is_supported_track(Path::new("x.MP3")));
        assert!(is_supported_track(Path::new("x.m4a")));
        assert!(!is_supported_track(Path::new("x.flac")));
        assert!(!is_supported_track(Path::new("x")));
    }
}
