//! Destination folder model.
//!
//! The destination is either a single flat directory (capacity 0) or a set
//! of numbered subfolders named after a template such as `"Folder %d"`.
//! [`FolderTemplate`] formats and recognizes those names; [`FolderIndex`]
//! holds the scanned layout: folder number to occupancy, plus the flat list
//! of destination files. Directory names that do not match the template are
//! ignored entirely, never tracked and never deleted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::fs::FileSystem;

/// Placeholder recognized in folder-name templates.
const PLACEHOLDER: &str = "%d";

/// A folder-name template with exactly one integer placeholder.
///
/// The same template drives both directions: `format` substitutes a number
/// into the placeholder position, `parse` strips the fixed prefix and suffix
/// and reads the digits back out. No general pattern matching is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTemplate {
    prefix: String,
    suffix: String,
}

impl FolderTemplate {
    /// Create a template from its string form.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the string contains exactly one
    /// `%d` placeholder.
    pub fn new(template: &str) -> Result<Self> {
        let mut parts = template.split(PLACEHOLDER);
        let prefix = parts.next().unwrap_or_default();
        let Some(suffix) = parts.next() else {
            return Err(Error::Configuration(format!(
                "folder template {template:?} is missing the {PLACEHOLDER} placeholder"
            )));
        };
        if parts.next().is_some() {
            return Err(Error::Configuration(format!(
                "folder template {template:?} must contain exactly one {PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Format a folder name for the given number.
    #[must_use]
    pub fn format(&self, number: u32) -> String {
        format!("{}{}{}", self.prefix, number, self.suffix)
    }

    /// Parse a folder name back into its number.
    ///
    /// Returns `None` for names that do not fit the template; such folders
    /// are invisible to the engine.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<u32> {
        let digits = name.strip_prefix(&self.prefix)?.strip_suffix(&self.suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl Default for FolderTemplate {
    fn default() -> Self {
        Self {
            prefix: "Folder ".to_string(),
            suffix: String::new(),
        }
    }
}

/// A file currently present on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationFile {
    /// Number of the folder holding the file (1 in single-folder mode).
    pub folder: u32,
    /// File basename.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

/// Scanned layout of the destination directory.
#[derive(Debug, Clone)]
pub struct FolderIndex {
    root: PathBuf,
    template: FolderTemplate,
    single_folder: bool,
    /// Folder number to current file count.
    occupancy: BTreeMap<u32, usize>,
    files: Vec<DestinationFile>,
}

impl FolderIndex {
    /// Scan the destination directory.
    ///
    /// In single-folder mode the destination root itself is folder 1 and
    /// only its regular files are listed. In folder mode only subdirectories
    /// whose names parse under the template are scanned, one level deep;
    /// files in the destination root and unmatched directories are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory listing fails.
    pub fn scan(
        fs: &dyn FileSystem,
        root: &Path,
        template: &FolderTemplate,
        single_folder: bool,
    ) -> Result<Self> {
        let mut index = Self {
            root: root.to_path_buf(),
            template: template.clone(),
            single_folder,
            occupancy: BTreeMap::new(),
            files: Vec::new(),
        };

        if single_folder {
            index.occupancy.insert(1, 0);
            for entry in fs.list_entries(root)? {
                if entry.is_file {
                    index.record_file(1, entry.name, root.to_path_buf());
                }
            }
        } else {
            for entry in fs.list_entries(root)? {
                if !entry.is_dir {
                    continue;
                }
                let Some(number) = template.parse(&entry.name) else {
                    continue;
                };
                index.occupancy.insert(number, 0);
                let folder_path = root.join(&entry.name);
                for sub in fs.list_entries(&folder_path)? {
                    // Sub-subdirectories are ignored.
                    if sub.is_file {
                        index.record_file(number, sub.name, folder_path.clone());
                    }
                }
            }
        }

        debug!(
            "Scanned destination {}: {} folders, {} files",
            root.display(),
            index.occupancy.len(),
            index.files.len()
        );
        Ok(index)
    }

    fn record_file(&mut self, folder: u32, name: String, dir: PathBuf) {
        let path = dir.join(&name);
        *self.occupancy.entry(folder).or_insert(0) += 1;
        self.files.push(DestinationFile { folder, name, path });
    }

    /// The destination root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the index operates in single-folder mode.
    #[must_use]
    pub const fn is_single_folder(&self) -> bool {
        self.single_folder
    }

    /// Path of a numbered folder. In single-folder mode this is the
    /// destination root.
    #[must_use]
    pub fn folder_path(&self, number: u32) -> PathBuf {
        if self.single_folder {
            self.root.clone()
        } else {
            self.root.join(self.template.format(number))
        }
    }

    /// Whether the given folder number is known.
    #[must_use]
    pub fn contains_folder(&self, number: u32) -> bool {
        self.occupancy.contains_key(&number)
    }

    /// Current occupancy of a folder, 0 if unknown.
    #[must_use]
    pub fn occupancy(&self, number: u32) -> usize {
        self.occupancy.get(&number).copied().unwrap_or(0)
    }

    /// Iterate over folder numbers and their occupancy, in numeric order.
    pub fn folders(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.occupancy.iter().map(|(&n, &c)| (n, c))
    }

    /// Number of known folders.
    #[must_use]
    pub fn folder_count(&self) -> usize {
        self.occupancy.len()
    }

    /// The flat list of destination files, in scan order.
    #[must_use]
    pub fn files(&self) -> &[DestinationFile] {
        &self.files
    }

    /// Total number of destination files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Register a brand-new folder with zero occupancy.
    pub fn add_folder(&mut self, number: u32) {
        self.occupancy.entry(number).or_insert(0);
    }

    /// Record an added file in a folder's occupancy count.
    pub fn record_addition(&mut self, number: u32) {
        *self.occupancy.entry(number).or_insert(0) += 1;
    }

    /// Record a removed file. Occupancy never goes below zero.
    pub fn record_deletion(&mut self, number: u32) {
        if let Some(count) = self.occupancy.get_mut(&number) {
            *count = count.saturating_sub(1);
        }
    }

    /// Remove a file from the flat listing by path.
    pub fn forget_file(&mut self, path: &Path) {
        self.files.retain(|f| f.path.as_path() != path);
    }

    /// Drop a folder from the index entirely.
    pub fn remove_folder(&mut self, number: u32) {
        self.occupancy.remove(&number);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_template_format_and_parse() {
        let template = FolderTemplate::new("Folder %d").unwrap();
        assert_eq!(template.format(3), "Folder 3");
        assert_eq!(template.parse("Folder 3"), Some(3));
        assert_eq!(template.parse("Folder 42"), Some(42));
        assert_eq!(template.parse("Folder x"), None);
        assert_eq!(template.parse("Music"), None);
        assert_eq!(template.parse("Folder "), None);
    }

    #[test]
    fn test_template_with_suffix() {
        let template = FolderTemplate::new("CD%d-disc").unwrap();
        assert_eq!(template.format(7), "CD7-disc");
        assert_eq!(template.parse("CD7-disc"), Some(7));
        assert_eq!(template.parse("CD7"), None);
    }

    #[test]
    fn test_template_rejects_missing_placeholder() {
        assert!(FolderTemplate::new("Folder").is_err());
    }

    #[test]
    fn test_template_rejects_double_placeholder() {
        assert!(FolderTemplate::new("%d-%d").is_err());
    }

    #[test]
    fn test_default_template_matches_spec_name() {
        let template = FolderTemplate::default();
        assert_eq!(template.format(1), "Folder 1");
    }

    #[test]
    fn test_scan_single_folder_mode() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.mp3"), b"a").unwrap();
        fs::write(temp.path().join("b.mp3"), b"b").unwrap();
        // Subdirectories are not descended into in single-folder mode.
        fs::create_dir(temp.path().join("Folder 1")).unwrap();
        fs::write(temp.path().join("Folder 1").join("c.mp3"), b"c").unwrap();

        let fs_impl = RealFileSystem::new();
        let template = FolderTemplate::default();
        let index = FolderIndex::scan(&fs_impl, temp.path(), &template, true).unwrap();

        assert_eq!(index.file_count(), 2);
        assert_eq!(index.occupancy(1), 2);
        assert_eq!(index.folder_count(), 1);
        assert_eq!(index.folder_path(1), temp.path());
    }

    #[test]
    fn test_scan_folder_mode_ignores_unmatched_names() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Folder 1")).unwrap();
        fs::create_dir(temp.path().join("Folder 3")).unwrap();
        fs::create_dir(temp.path().join("Covers")).unwrap();
        fs::write(temp.path().join("Folder 1").join("a.mp3"), b"a").unwrap();
        fs::write(temp.path().join("Folder 1").join("b.mp3"), b"b").unwrap();
        fs::write(temp.path().join("Folder 3").join("c.mp3"), b"c").unwrap();
        fs::write(temp.path().join("Covers").join("front.jpg"), b"j").unwrap();
        // Root files are ignored in folder mode.
        fs::write(temp.path().join("loose.mp3"), b"l").unwrap();

        let fs_impl = RealFileSystem::new();
        let template = FolderTemplate::default();
        let index = FolderIndex::scan(&fs_impl, temp.path(), &template, false).unwrap();

        assert_eq!(index.folder_count(), 2);
        assert_eq!(index.occupancy(1), 2);
        assert_eq!(index.occupancy(3), 1);
        assert!(!index.contains_folder(2));
        assert_eq!(index.file_count(), 3);
    }

    #[test]
    fn test_record_deletion_never_goes_negative() {
        let temp = TempDir::new().unwrap();
        let fs_impl = RealFileSystem::new();
        let template = FolderTemplate::default();
        let mut index = FolderIndex::scan(&fs_impl, temp.path(), &template, true).unwrap();

        index.record_deletion(1);
        index.record_deletion(1);
        assert_eq!(index.occupancy(1), 0);
    }
}
