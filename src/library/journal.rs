//! Append-only plain-text log of generated recommendations.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::auth::Session;
use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::Timestamp;

/// File name of the journal inside the data directory.
pub const JOURNAL_FILE: &str = "reading_recommendations.txt";

/// Recommendation sessions, one timestamp-delimited entry each.
#[derive(Debug, Clone)]
pub struct RecommendationJournal {
    path: PathBuf,
}

impl RecommendationJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(JOURNAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Requires write capability.
    ///
    /// Entry layout: a blank line, `===== <timestamp> =====`, the text, a
    /// trailing newline.
    pub fn append(&self, session: &Session, text: &str, at: Timestamp) -> LibraryResult<()> {
        session.authorize()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LibraryError::JournalIo {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }

        let entry = format!("\n===== {} =====\n{text}\n", at.format("%Y-%m-%dT%H:%M:%S"));
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(entry.as_bytes()))
            .map_err(|e| LibraryError::JournalIo {
                message: format!("append {}: {e}", self.path.display()),
            })?;

        tracing::info!(path = %self.path.display(), "recommendations saved");
        Ok(())
    }
}
