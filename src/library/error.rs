//! Rich diagnostic error types for the book library.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from library operations.
#[derive(Debug, Error, Diagnostic)]
pub enum LibraryError {
    #[error("book not found: \"{id}\"")]
    #[diagnostic(
        code(ledger::library::not_found),
        help(
            "No book with this ID exists in the collection. \
             List the collection with `ledger list` to find the right ID."
        )
    )]
    BookNotFound { id: String },

    #[error("title is required")]
    #[diagnostic(
        code(ledger::library::empty_title),
        help("Every book needs a non-empty title. Pass one with --title.")
    )]
    EmptyTitle,

    #[error("cannot import books: {message}")]
    #[diagnostic(
        code(ledger::library::invalid_import),
        help("The import file must be a JSON array of book objects, each with a \"title\".")
    )]
    InvalidImport { message: String },

    #[error("unsupported cover format: \"{extension}\"")]
    #[diagnostic(
        code(ledger::library::unsupported_cover),
        help("Covers must be .jpg, .jpeg or .png files.")
    )]
    UnsupportedCover { extension: String },

    #[error("cover I/O error: {message}")]
    #[diagnostic(
        code(ledger::library::cover_io),
        help(
            "Failed to write the cover image. Check that the covers directory \
             exists and has correct permissions."
        )
    )]
    CoverIo { message: String },

    #[error("collection I/O error: {message}")]
    #[diagnostic(
        code(ledger::library::store_io),
        help(
            "Failed to write the book collection. Check that the data \
             directory exists, has correct permissions, and the disk is not full."
        )
    )]
    StoreIo { message: String },

    #[error("journal I/O error: {message}")]
    #[diagnostic(
        code(ledger::library::journal_io),
        help("Failed to append to the recommendations journal. Check file permissions.")
    )]
    JournalIo { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] crate::auth::AuthError),
}

/// Convenience alias for library operation results.
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
