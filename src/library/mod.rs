//! The book collection: records, persistence, covers, queries and edits.
//!
//! Records live in one JSON file that is loaded whole and saved whole.
//! Reads are public; every mutation goes through [`BookCatalog`] and needs
//! an admin [`Session`](crate::auth::Session).

pub mod catalog;
pub mod covers;
pub mod error;
pub mod journal;
pub mod model;
pub mod normalize;
pub mod query;
pub mod store;

pub use catalog::{BookCatalog, BookForm, CoverUpload, QuickEdit, SavedBook};
pub use covers::{CoverStore, slugify};
pub use error::{LibraryError, LibraryResult};
pub use journal::RecommendationJournal;
pub use model::{BookDraft, BookRecord, ReadingStatus, Timestamp};
pub use normalize::normalize;
pub use query::{BookFilter, Overview, currently_reading};
pub use store::BookStore;
