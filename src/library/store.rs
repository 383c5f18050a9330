//! Whole-file JSON persistence for the book collection.
//!
//! The collection is one JSON array in one file (`books_db.json`). Every
//! interaction loads it in full and every mutation writes it back in full.
//! Nothing is locked: two writers racing on the same file both succeed and
//! the later save silently wins.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::BookRecord;

/// File name of the collection inside the data directory.
pub const BOOKS_FILE: &str = "books_db.json";

/// Reads and writes the backing JSON file.
#[derive(Debug, Clone)]
pub struct BookStore {
    path: PathBuf,
}

impl BookStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `{dir}/books_db.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(BOOKS_FILE))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// A missing file is an empty collection. So is a file that cannot be
    /// read or does not parse as an array of records: that failure is
    /// deliberately swallowed and only traced at debug level. The next save
    /// overwrites the unparsable file.
    pub fn load(&self) -> Vec<BookRecord> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "collection unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "collection unparsable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the file with the full collection.
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the
    /// collection file, so readers see either the old or the new array.
    pub fn save(&self, records: &[BookRecord]) -> LibraryResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LibraryError::StoreIo {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|e| LibraryError::StoreIo {
            message: format!("serialize collection: {e}"),
        })?;

        let tmp_path = self
            .path
            .with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        let written = std::fs::File::create(&tmp_path).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.flush()?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(LibraryError::StoreIo {
                message: format!("write {}: {e}", tmp_path.display()),
            });
        }

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            LibraryError::StoreIo {
                message: format!("replace {}: {e}", self.path.display()),
            }
        })?;

        tracing::info!(path = %self.path.display(), count = records.len(), "collection saved");
        Ok(())
    }
}
