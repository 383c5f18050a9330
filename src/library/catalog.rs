//! Admin-gated mutations over the persisted collection.
//!
//! Each operation is a full read-modify-write cycle: load the whole file,
//! change one record, save the whole file. Normalization runs on every
//! record written. There is no locking; concurrent admin sessions race and
//! the last save wins without merging.

use std::path::{Path, PathBuf};

use crate::auth::Session;
use crate::library::covers::CoverStore;
use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::{BookDraft, BookRecord, ReadingStatus, now};
use crate::library::normalize::normalize;
use crate::library::store::BookStore;

/// An uploaded cover image: original file name and raw bytes.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CoverUpload {
    /// Read an image file from disk as an upload.
    pub fn from_path(path: &Path) -> LibraryResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| LibraryError::CoverIo {
            message: format!("read {}: {e}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// The add/update form.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    /// Record to update; `None` adds a new book.
    pub target: Option<String>,
    /// Fields to set. Unset fields keep their current (or default) value.
    pub fields: BookDraft,
    /// New cover to store, replacing any current one.
    pub cover: Option<CoverUpload>,
    /// Drop the current cover (ignored when `cover` is set).
    pub remove_cover: bool,
}

/// Fields editable from the library list without opening the full form.
#[derive(Debug, Clone, Default)]
pub struct QuickEdit {
    pub favorite: Option<bool>,
    pub status: Option<ReadingStatus>,
    /// `Some(None)` clears the rating.
    pub rating: Option<Option<i64>>,
    pub tags: Option<Vec<String>>,
}

impl From<QuickEdit> for BookDraft {
    fn from(edit: QuickEdit) -> Self {
        BookDraft {
            favorite: edit.favorite,
            status: edit.status,
            rating: edit.rating,
            tags: edit.tags,
            ..Default::default()
        }
    }
}

/// Result of [`BookCatalog::save_book`].
#[derive(Debug, Clone)]
pub struct SavedBook {
    pub record: BookRecord,
    /// Whether the record was newly added (as opposed to updated).
    pub created: bool,
}

/// The book collection plus its cover files.
#[derive(Debug, Clone)]
pub struct BookCatalog {
    store: BookStore,
    covers: CoverStore,
}

impl BookCatalog {
    pub fn new(store: BookStore, covers: CoverStore) -> Self {
        Self { store, covers }
    }

    /// Catalog using the default file layout under `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self::new(BookStore::in_dir(data_dir), CoverStore::in_dir(data_dir))
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    pub fn covers(&self) -> &CoverStore {
        &self.covers
    }

    /// Load the full collection. Public; needs no capability.
    pub fn books(&self) -> Vec<BookRecord> {
        self.store.load()
    }

    /// Look up a book by ID.
    pub fn get(&self, id: &str) -> LibraryResult<BookRecord> {
        self.books()
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| LibraryError::BookNotFound { id: id.into() })
    }

    /// Add a new book or update an existing one from the form.
    ///
    /// The title is validated before anything touches the disk. A new cover
    /// is written before the collection; if saving the collection then
    /// fails, the new cover is removed again. A replaced or removed cover is
    /// unlinked only after the collection was saved.
    pub fn save_book(&self, session: &Session, form: BookForm) -> LibraryResult<SavedBook> {
        session.authorize()?;
        let mut books = self.store.load();

        let position = match &form.target {
            Some(id) => Some(
                books
                    .iter()
                    .position(|b| &b.id == id)
                    .ok_or_else(|| LibraryError::BookNotFound { id: id.clone() })?,
            ),
            None => None,
        };
        let base = position.map(|i| books[i].to_draft()).unwrap_or_default();

        let mut fields = form.fields;
        fields.id = None;
        fields.created_at = None;
        fields.updated_at = None;
        let mut draft = base.overlay(fields);
        trim_text_fields(&mut draft);

        let title = draft.title.as_deref().unwrap_or_default();
        if title.is_empty() {
            return Err(LibraryError::EmptyTitle);
        }

        let previous_cover = position.and_then(|i| books[i].cover_path.clone());
        let mut new_cover: Option<PathBuf> = None;
        let mut stale_cover: Option<PathBuf> = None;
        if let Some(upload) = &form.cover {
            let path = self.covers.save(title, &upload.file_name, &upload.bytes)?;
            draft.cover_path = Some(Some(path.clone()));
            new_cover = Some(path);
            stale_cover = previous_cover;
        } else if form.remove_cover {
            draft.cover_path = Some(None);
            stale_cover = previous_cover;
        }

        let record = normalize(draft, now());
        let created = position.is_none();
        match position {
            Some(i) => books[i] = record.clone(),
            None => books.push(record.clone()),
        }

        if let Err(e) = self.store.save(&books) {
            if let Some(path) = &new_cover {
                self.covers.remove(path);
            }
            return Err(e);
        }
        if let Some(path) = &stale_cover {
            self.covers.remove(path);
        }

        tracing::info!(id = %record.id, created, "book saved");
        Ok(SavedBook { record, created })
    }

    /// Add every draft in a JSON array as a new book, with a single save.
    ///
    /// Imported drafts get fresh ids and timestamps and no cover. One draft
    /// without a title rejects the whole import before anything is written.
    pub fn import_json(&self, session: &Session, json: &str) -> LibraryResult<Vec<BookRecord>> {
        session.authorize()?;
        let drafts = BookDraft::list_from_json(json).map_err(|e| LibraryError::InvalidImport {
            message: e.to_string(),
        })?;

        let stamp = now();
        let mut imported = Vec::with_capacity(drafts.len());
        for mut draft in drafts {
            draft.id = None;
            draft.created_at = None;
            draft.updated_at = None;
            draft.cover_path = None;
            trim_text_fields(&mut draft);
            if draft.title.as_deref().unwrap_or_default().is_empty() {
                return Err(LibraryError::EmptyTitle);
            }
            imported.push(normalize(draft, stamp));
        }

        let mut books = self.store.load();
        books.extend(imported.iter().cloned());
        self.store.save(&books)?;

        tracing::info!(count = imported.len(), "books imported");
        Ok(imported)
    }

    /// Set reading progress. Reaching 100 marks the book read.
    pub fn update_progress(&self, session: &Session, id: &str, progress: i64) -> LibraryResult<BookRecord> {
        self.patch(
            session,
            id,
            BookDraft {
                progress: Some(progress),
                ..Default::default()
            },
        )
    }

    /// Apply a quick edit (favorite, status, rating, tags).
    pub fn quick_edit(&self, session: &Session, id: &str, edit: QuickEdit) -> LibraryResult<BookRecord> {
        self.patch(session, id, edit.into())
    }

    /// Remove a book by ID and unlink its cover. Returns the removed record.
    pub fn remove(&self, session: &Session, id: &str) -> LibraryResult<BookRecord> {
        session.authorize()?;
        let mut books = self.store.load();
        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| LibraryError::BookNotFound { id: id.into() })?;
        let record = books.remove(pos);
        self.store.save(&books)?;

        if let Some(cover) = &record.cover_path {
            self.covers.remove(cover);
        }
        tracing::info!(id = %record.id, "book deleted");
        Ok(record)
    }

    fn patch(&self, session: &Session, id: &str, mut patch: BookDraft) -> LibraryResult<BookRecord> {
        session.authorize()?;
        let mut books = self.store.load();
        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| LibraryError::BookNotFound { id: id.into() })?;

        patch.id = None;
        patch.created_at = None;
        patch.updated_at = None;
        let record = normalize(books[pos].to_draft().overlay(patch), now());
        books[pos] = record.clone();
        self.store.save(&books)?;

        tracing::info!(id = %record.id, status = %record.status, progress = record.progress, "book updated");
        Ok(record)
    }
}

fn trim_text_fields(draft: &mut BookDraft) {
    for field in [&mut draft.title, &mut draft.author, &mut draft.notes] {
        if let Some(value) = field.as_mut() {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }
}
