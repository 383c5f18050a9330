// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # book-ledger
//!
//! A personal reading tracker: a JSON-backed collection of books with
//! public reads, admin-gated writes, and LLM reading recommendations seeded
//! from the books already read.
//!
//! ## Architecture
//!
//! - **Library** (`library`): records, normalization, whole-file JSON store,
//!   cover files, queries, and the admin-gated catalog operations
//! - **Auth** (`auth`): shared-secret login yielding a session-scoped write capability
//! - **Recommendations** (`recommend`): seed list and prompt construction
//! - **LLM** (`llm`): blocking client for Ollama / OpenAI-compatible chat APIs
//! - **Config & paths** (`config`, `paths`): TOML config, XDG layout
//!
//! ## Library usage
//!
//! ```no_run
//! use book_ledger::auth::{AdminGate, Session};
//! use book_ledger::library::{BookCatalog, BookDraft, BookFilter, BookForm};
//!
//! let catalog = BookCatalog::open(std::path::Path::new("/tmp/ledger"));
//! let mut session = Session::viewer();
//! session.login(&AdminGate::new(Some("secret".into())), "secret").unwrap();
//!
//! let form = BookForm {
//!     fields: BookDraft { title: Some("Dune".into()), ..Default::default() },
//!     ..Default::default()
//! };
//! catalog.save_book(&session, form).unwrap();
//!
//! let books = catalog.books();
//! let hits = BookFilter { text: Some("dune".into()), ..Default::default() }.apply(&books);
//! assert_eq!(hits.len(), 1);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod library;
pub mod llm;
pub mod paths;
pub mod recommend;
