//! Core data types for the book library.
//!
//! A [`BookRecord`] is the well-formed, persisted shape of one tracked book.
//! A [`BookDraft`] is the partial shape that edits are expressed in; it
//! becomes a record only by passing through
//! [`normalize`](crate::library::normalize::normalize).

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Local wall-clock time with whole-second precision.
pub type Timestamp = NaiveDateTime;

/// Current local time truncated to whole seconds.
pub fn now() -> Timestamp {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Where a book sits in the reading lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    /// All statuses in display order.
    pub const ALL: [ReadingStatus; 3] = [Self::ToRead, Self::Reading, Self::Read];

    /// The persisted name (`to_read`, `reading`, `read`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToRead => "to_read",
            Self::Reading => "reading",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "to_read" => Ok(Self::ToRead),
            "reading" => Ok(Self::Reading),
            "read" => Ok(Self::Read),
            other => Err(format!(
                "unknown status \"{other}\" (expected to_read, reading or read)"
            )),
        }
    }
}

/// Persistent record for one book in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Generated identifier, immutable once assigned.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub status: ReadingStatus,
    /// Reading progress in percent, always within `0..=100`.
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub favorite: bool,
    /// Case-sensitive, deduplicated, sorted.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub cover_path: Option<PathBuf>,
    /// Optional score within `1..=10`.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "now")]
    pub created_at: Timestamp,
    #[serde(default = "now")]
    pub updated_at: Timestamp,
}

impl BookRecord {
    /// Convert back into a fully populated draft, e.g. as the base of an edit.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            status: Some(self.status),
            progress: Some(i64::from(self.progress)),
            favorite: Some(self.favorite),
            tags: Some(self.tags.iter().cloned().collect()),
            cover_path: Some(self.cover_path.clone()),
            rating: Some(self.rating.map(i64::from)),
            notes: Some(self.notes.clone()),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    /// Whether the record carries every tag in `wanted` (compared lowercase).
    pub fn has_all_tags_ci(&self, wanted: &BTreeSet<String>) -> bool {
        let own: BTreeSet<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
        wanted.is_subset(&own)
    }
}

/// A partial book record. `None` means "not provided".
///
/// Nested options (`cover_path`, `rating`) distinguish "leave as is" (`None`)
/// from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<ReadingStatus>,
    #[serde(deserialize_with = "deserialize_optional_progress")]
    pub progress: Option<i64>,
    pub favorite: Option<bool>,
    /// Raw tag input, not yet trimmed or deduplicated.
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub cover_path: Option<Option<PathBuf>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub rating: Option<Option<i64>>,
    pub notes: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl BookDraft {
    /// Overlay every field provided in `patch` on top of `self`.
    pub fn overlay(self, patch: BookDraft) -> BookDraft {
        BookDraft {
            id: patch.id.or(self.id),
            title: patch.title.or(self.title),
            author: patch.author.or(self.author),
            status: patch.status.or(self.status),
            progress: patch.progress.or(self.progress),
            favorite: patch.favorite.or(self.favorite),
            tags: patch.tags.or(self.tags),
            cover_path: patch.cover_path.or(self.cover_path),
            rating: patch.rating.or(self.rating),
            notes: patch.notes.or(self.notes),
            created_at: patch.created_at.or(self.created_at),
            updated_at: patch.updated_at.or(self.updated_at),
        }
    }

    /// Parse a JSON array of loosely-typed drafts, as found in import files.
    ///
    /// `progress` accepts numbers or numeric strings; other values become 0.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Coerce a loosely-typed progress value to an integer percent.
///
/// Integers pass through, floats truncate toward zero, numeric strings are
/// parsed. Anything else (null, booleans, non-numeric text) becomes `0`.
pub fn coerce_progress(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => coerce_progress_str(s),
        _ => 0,
    }
}

/// String form of [`coerce_progress`].
pub fn coerce_progress_str(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        })
        .unwrap_or(0)
}

/// Clamp a raw percent into `0..=100`.
pub fn clamp_progress(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

fn deserialize_progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(clamp_progress(coerce_progress(&value)))
}

fn deserialize_optional_progress<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(Some(coerce_progress(&value)))
}

fn deserialize_some<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}
