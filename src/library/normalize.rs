//! The defaulting pass that turns a [`BookDraft`] into a well-formed [`BookRecord`].

use std::collections::BTreeSet;

use crate::library::model::{
    BookDraft, BookRecord, ReadingStatus, Timestamp, clamp_progress,
};

/// Highest accepted rating.
pub const MAX_RATING: i64 = 10;

/// Fill defaults and enforce record invariants.
///
/// - `id`: a fresh UUID when absent.
/// - `created_at`: `now` when absent; `updated_at` is always set to `now`,
///   so re-normalizing an unchanged record still advances it.
/// - `tags`: trimmed, empties dropped, deduplicated, sorted.
/// - `progress`: clamped to `0..=100`.
/// - `rating`: `0` means unrated, values above [`MAX_RATING`] clamp down.
/// - `status`: forced to `read` when progress reaches 100. Lower progress
///   never reverts a `read` status.
///
/// Title emptiness is not checked here; writes validate it before
/// normalizing.
pub fn normalize(draft: BookDraft, now: Timestamp) -> BookRecord {
    let progress = clamp_progress(draft.progress.unwrap_or(0));
    let mut status = draft.status.unwrap_or_default();
    if progress >= 100 {
        status = ReadingStatus::Read;
    }

    BookRecord {
        id: draft.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        title: draft.title.unwrap_or_default(),
        author: draft.author.unwrap_or_default(),
        status,
        progress,
        favorite: draft.favorite.unwrap_or(false),
        tags: normalize_tags(draft.tags.unwrap_or_default()),
        cover_path: draft.cover_path.flatten(),
        rating: normalize_rating(draft.rating.flatten()),
        notes: draft.notes.unwrap_or_default(),
        created_at: draft.created_at.unwrap_or(now),
        updated_at: now,
    }
}

/// Trim, drop empty, dedupe and sort.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split comma-separated tag input into raw tags.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn normalize_rating(raw: Option<i64>) -> Option<u8> {
    match raw {
        Some(r) if r >= 1 => Some(r.min(MAX_RATING) as u8),
        _ => None,
    }
}
