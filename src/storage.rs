//! Presentation storage: filename sanitization and the on-disk root directory.
//!
//! All presentation files live flat inside a single root directory. The root
//! is injected at construction so tests can point the store at an isolated
//! temporary directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};

use crate::error::{PowerPointServerError, Result};

/// Default storage directory for presentation files.
pub const DEFAULT_ROOT: &str = "/tmp/PowerPoints";

/// File extension appended to every presentation filename.
pub const PPTX_EXTENSION: &str = ".pptx";

/// Characters that are illegal in filenames on common filesystems.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// On-disk facts about one stored presentation file.
#[derive(Debug, Clone)]
pub struct StoredPresentation {
    /// Filename within the root directory (extension included).
    pub filename: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: DateTime<Local>,
}

/// Handle to the presentation root directory.
///
/// Cloning is cheap; clones share the write lock, so overlapping mutations
/// through the same store serialize their load-mutate-save sequences.
#[derive(Clone)]
pub struct PresentationStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Default for PresentationStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl PresentationStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is not created here; call [`ensure_root`](Self::ensure_root)
    /// before writing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The root directory all presentations live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root directory as a display string for result messages.
    pub fn root_display(&self) -> String {
        self.root.display().to_string()
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| {
            PowerPointServerError::DirectoryCreate {
                path: self.root_display(),
                source,
            }
        })
    }

    /// Resolve a sanitized filename to its path under the root directory.
    ///
    /// Appends the `.pptx` extension unless the name already carries it, so
    /// resolving an already-suffixed name does not duplicate the extension.
    pub fn resolve(&self, sanitized: &str) -> PathBuf {
        self.root.join(normalize_filename(sanitized))
    }

    /// Size and modification time for one presentation file.
    pub fn metadata(&self, path: &Path) -> Result<(u64, DateTime<Local>)> {
        let meta = std::fs::metadata(path)?;
        Ok((meta.len(), DateTime::from(meta.modified()?)))
    }

    /// List all presentation files in the root directory, sorted by filename.
    ///
    /// Returns `None` when the root directory does not exist (distinct from
    /// an existing-but-empty directory).
    pub fn list_files(&self) -> Result<Option<Vec<StoredPresentation>>> {
        if !self.root.exists() {
            return Ok(None);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().to_string();
            if !filename.ends_with(PPTX_EXTENSION) {
                continue;
            }
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            files.push(StoredPresentation {
                filename,
                size_bytes: meta.len(),
                modified: DateTime::from(meta.modified()?),
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(Some(files))
    }

    /// Take the write lock for a load-mutate-save sequence.
    pub fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| PowerPointServerError::internal(format!("Write lock poisoned: {}", e)))
    }
}

/// Append the `.pptx` extension unless the name already carries it.
pub fn normalize_filename(sanitized: &str) -> String {
    if sanitized.ends_with(PPTX_EXTENSION) {
        sanitized.to_string()
    } else {
        format!("{}{}", sanitized, PPTX_EXTENSION)
    }
}

/// Replace filesystem-illegal characters with underscores and trim
/// surrounding whitespace.
///
/// An empty result is not rejected here; callers check emptiness and report
/// the missing-filename error themselves.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_filename("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("q1/q2\\q3"), "q1_q2_q3");
        assert_eq!(sanitize_filename("what?|*\""), "what____");
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(sanitize_filename("  report  "), "report");
        assert_eq!(sanitize_filename("   "), "");
    }

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("Quarterly Report"), "Quarterly Report");
    }

    #[test]
    fn test_resolve_appends_extension() {
        let store = PresentationStore::new("/tmp/decks");
        assert_eq!(
            store.resolve("report"),
            PathBuf::from("/tmp/decks/report.pptx")
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let store = PresentationStore::new("/tmp/decks");
        assert_eq!(
            store.resolve("report.pptx"),
            PathBuf::from("/tmp/decks/report.pptx")
        );
    }

    #[test]
    fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("decks");
        let store = PresentationStore::new(&root);
        assert!(!root.exists());
        store.ensure_root().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_list_files_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresentationStore::new(dir.path().join("absent"));
        assert!(store.list_files().unwrap().is_none());
    }

    #[test]
    fn test_list_files_skips_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresentationStore::new(dir.path());
        std::fs::write(dir.path().join("b.pptx"), b"x").unwrap();
        std::fs::write(dir.path().join("a.pptx"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = store.list_files().unwrap().unwrap();
        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pptx", "b.pptx"]);
    }
}
