//! Filesystem storage for uploaded client documents.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

/// Stores document files under a media root, mirroring the record's
/// relative `file_path` column.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("documents"))?;
        Ok(Self { root })
    }

    /// Write `bytes` under `documents/` and return the relative path
    /// recorded in the database. A millisecond timestamp prefix keeps
    /// repeated uploads of the same file name from colliding.
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        let relative = format!(
            "documents/{}_{}",
            Utc::now().timestamp_millis(),
            sanitize(file_name)
        );
        std::fs::write(self.root.join(&relative), bytes)?;
        Ok(relative)
    }

    /// Remove a stored file. A file already missing on disk is not an
    /// error; the record is the source of truth.
    pub fn delete(&self, relative: &str) -> io::Result<()> {
        match std::fs::remove_file(self.root.join(relative)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path()).unwrap();

        let relative = store.save("rc book.pdf", b"contents").unwrap();
        assert!(relative.starts_with("documents/"));
        assert!(relative.ends_with("rc_book.pdf"));
        assert!(store.absolute(&relative).exists());

        store.delete(&relative).unwrap();
        assert!(!store.absolute(&relative).exists());
        // Deleting again is a no-op.
        store.delete(&relative).unwrap();
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize(""), "upload");
    }
}
