//! Top-level diagnostic error type for book-ledger.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives; [`LedgerError`] wraps them transparently so error codes and help
//! text survive through to the user.

use miette::Diagnostic;
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::library::error::LibraryError;
use crate::llm::LlmError;
use crate::paths::PathError;

/// Any error the ledger can report.
#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] PathError),
}

/// Convenience alias for ledger results.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
