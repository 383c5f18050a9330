//! Cover image files stored next to the collection.
//!
//! Covers are raw uploaded bytes, never decoded or resized. Each one lives
//! in the covers directory as `<slug-of-title>-<random-hex><ext>`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::library::error::{LibraryError, LibraryResult};

/// Directory name of the cover store inside the data directory.
pub const COVERS_DIR: &str = "covers";

/// Accepted upload extensions (lowercase, without the dot).
pub const COVER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex"));

/// Generate a file-name-safe slug from a title.
///
/// Characters that are not word characters, whitespace or hyphens are
/// removed, the rest is trimmed and lowercased, and runs of whitespace,
/// underscores and hyphens collapse to a single hyphen. Titles that slug to
/// nothing get a random UUID instead.
pub fn slugify(title: &str) -> String {
    let stripped = NON_WORD.replace_all(title, "");
    let lowered = stripped.trim().to_lowercase();
    let slug = SEPARATORS.replace_all(&lowered, "-").into_owned();
    if slug.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        slug
    }
}

/// Writes and unlinks cover files.
#[derive(Debug, Clone)]
pub struct CoverStore {
    dir: PathBuf,
}

impl CoverStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cover store at `{data_dir}/covers`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(COVERS_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist uploaded cover bytes for a book titled `title`.
    ///
    /// `upload_name` is the original file name; only its extension is used.
    pub fn save(&self, title: &str, upload_name: &str, bytes: &[u8]) -> LibraryResult<PathBuf> {
        let ext = cover_extension(upload_name)?;

        std::fs::create_dir_all(&self.dir).map_err(|e| LibraryError::CoverIo {
            message: format!("create dir {}: {e}", self.dir.display()),
        })?;

        let file_name = format!(
            "{}-{}.{ext}",
            slugify(title),
            uuid::Uuid::new_v4().simple()
        );
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|e| LibraryError::CoverIo {
            message: format!("write {}: {e}", path.display()),
        })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "cover saved");
        Ok(path)
    }

    /// Unlink a cover file. Best-effort: failures are logged and dropped,
    /// which can leave an orphaned file behind.
    pub fn remove(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "cover removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove cover, leaving it orphaned");
            }
        }
    }
}

fn cover_extension(upload_name: &str) -> LibraryResult<String> {
    let ext = Path::new(upload_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if COVER_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(LibraryError::UnsupportedCover { extension: ext })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("special!@#chars"), "specialchars");
        assert_eq!(slugify("snake_case -- and  dashes"), "snake-case-and-dashes");
        assert_eq!(slugify("L'Étranger"), "létranger");
    }

    #[test]
    fn slugify_empty_falls_back_to_uuid() {
        let slug = slugify("!!!");
        assert!(uuid::Uuid::parse_str(&slug).is_ok(), "not a uuid: {slug}");
    }

    #[test]
    fn save_names_file_after_title() {
        let dir = tempfile::TempDir::new().unwrap();
        let covers = CoverStore::in_dir(dir.path());
        let path = covers.save("The Left Hand of Darkness", "scan.JPG", b"jpegbytes").unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("the-left-hand-of-darkness-"), "{name}");
        assert!(name.ends_with(".jpg"), "{name}");
        assert_eq!(std::fs::read(&path).unwrap(), b"jpegbytes");
        assert!(path.starts_with(covers.dir()));
    }

    #[test]
    fn save_rejects_unknown_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let covers = CoverStore::in_dir(dir.path());
        let err = covers.save("Title", "cover.gif", b"gif").unwrap_err();
        assert!(matches!(err, LibraryError::UnsupportedCover { .. }));
        let err = covers.save("Title", "cover", b"raw").unwrap_err();
        assert!(matches!(err, LibraryError::UnsupportedCover { .. }));
    }

    #[test]
    fn remove_is_best_effort() {
        let dir = tempfile::TempDir::new().unwrap();
        let covers = CoverStore::in_dir(dir.path());
        let path = covers.save("Gone", "c.png", b"png").unwrap();
        covers.remove(&path);
        assert!(!path.exists());
        // Second removal of a missing file is silently ignored.
        covers.remove(&path);
    }
}
