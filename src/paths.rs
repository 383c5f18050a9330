//! XDG-compliant path resolution for book-ledger.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::library::covers::COVERS_DIR;
use crate::library::journal::JOURNAL_FILE;
use crate::library::store::BOOKS_FILE;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(ledger::paths::no_home),
        help("Set the HOME environment variable or pass --data-dir and --config explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(ledger::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Directories used by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPaths {
    /// `$XDG_CONFIG_HOME/book-ledger/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/book-ledger/`: collection, covers, journal.
    pub data_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("book-ledger");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("book-ledger");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// `explicit`, or the config file of the `fallback` layout.
    ///
    /// `fallback` (normally [`LedgerPaths::resolve`]) only runs when no path
    /// was given, so explicit locations work without a home directory.
    pub fn config_file_or(
        explicit: Option<&Path>,
        fallback: impl FnOnce() -> PathResult<Self>,
    ) -> PathResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(fallback()?.config_file()),
        }
    }

    /// `explicit`, or the data directory of the `fallback` layout.
    pub fn data_dir_or(
        explicit: Option<&Path>,
        fallback: impl FnOnce() -> PathResult<Self>,
    ) -> PathResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(fallback()?.data_dir),
        }
    }

    /// Same layout rooted at explicit directories.
    pub fn at(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the collection JSON.
    pub fn books_file(&self) -> PathBuf {
        self.data_dir.join(BOOKS_FILE)
    }

    /// Directory holding cover images.
    pub fn covers_dir(&self) -> PathBuf {
        self.data_dir.join(COVERS_DIR)
    }

    /// Path to the recommendations journal.
    pub fn journal_file(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    /// Create all directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.covers_dir()] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}
