//! In-memory filtering over the collection.
//!
//! Everything here is a linear scan; the collection is small enough that no
//! index is kept.

use std::collections::BTreeSet;

use crate::library::model::{BookRecord, ReadingStatus};
use crate::library::normalize::split_tags;

/// Predicates for narrowing the collection. Default matches everything.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring matched against title or author.
    pub text: Option<String>,
    /// Tags that must all be present, compared case-insensitively.
    pub tags: Vec<String>,
    pub favorites_only: bool,
    pub status: Option<ReadingStatus>,
}

impl BookFilter {
    /// Build a tag list from comma-separated input.
    pub fn with_tag_list(mut self, input: &str) -> Self {
        self.tags = split_tags(input);
        self
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, book: &BookRecord) -> bool {
        self.matches_with(book, &self.wanted_tags(), self.needle().as_deref())
    }

    /// Matching records, in collection order.
    pub fn apply<'a>(&self, books: &'a [BookRecord]) -> Vec<&'a BookRecord> {
        let wanted = self.wanted_tags();
        let needle = self.needle();
        books
            .iter()
            .filter(|b| self.matches_with(b, &wanted, needle.as_deref()))
            .collect()
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    fn wanted_tags(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn matches_with(&self, book: &BookRecord, wanted: &BTreeSet<String>, needle: Option<&str>) -> bool {
        if let Some(needle) = needle
            && !book.title.to_lowercase().contains(needle)
            && !book.author.to_lowercase().contains(needle)
        {
            return false;
        }
        if !wanted.is_empty() && !book.has_all_tags_ci(wanted) {
            return false;
        }
        if self.favorites_only && !book.favorite {
            return false;
        }
        if let Some(status) = self.status
            && book.status != status
        {
            return false;
        }
        true
    }
}

/// Books currently being read, in collection order.
pub fn currently_reading(books: &[BookRecord]) -> Vec<&BookRecord> {
    BookFilter {
        status: Some(ReadingStatus::Reading),
        ..Default::default()
    }
    .apply(books)
}

/// Per-status totals for the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overview {
    pub total: usize,
    pub to_read: usize,
    pub reading: usize,
    pub read: usize,
}

impl Overview {
    pub fn of(books: &[BookRecord]) -> Self {
        let mut overview = Self {
            total: books.len(),
            ..Default::default()
        };
        for book in books {
            match book.status {
                ReadingStatus::ToRead => overview.to_read += 1,
                ReadingStatus::Reading => overview.reading += 1,
                ReadingStatus::Read => overview.read += 1,
            }
        }
        overview
    }
}
