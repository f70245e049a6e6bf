//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical book record persisted in the local snapshot.
//! - Provide tag-set helpers that keep insertion order.
//!
//! # Invariants
//! - `id` is stable and never reused for another book.
//! - `tags` never contains duplicates or blank entries.
//! - `last_updated` is epoch milliseconds of the latest mutation.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a book.
///
/// Seed books use short numeric ids, new books get a UUID v4 string.
pub type BookId = String;

/// Reading lifecycle of one book on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// Currently being read.
    Reading,
    /// Read to the end.
    Finished,
    /// Bought but not started yet (unread stack).
    Tsundoku,
}

impl BookStatus {
    /// All statuses in shelf display order.
    pub const ALL: [BookStatus; 3] = [Self::Reading, Self::Finished, Self::Tsundoku];

    /// Wire/CLI name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Finished => "finished",
            Self::Tsundoku => "tsundoku",
        }
    }

    /// Japanese shelf label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Reading => "読書中",
            Self::Finished => "読了",
            Self::Tsundoku => "積読",
        }
    }
}

impl FromStr for BookStatus {
    type Err = BookValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(Self::Reading),
            "finished" => Ok(Self::Finished),
            "tsundoku" | "unread" => Ok(Self::Tsundoku),
            other => Err(BookValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Shelf category of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Business,
    Novel,
    Philosophy,
    Art,
    Science,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Business,
        Self::Novel,
        Self::Philosophy,
        Self::Art,
        Self::Science,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Novel => "Novel",
            Self::Philosophy => "Philosophy",
            Self::Art => "Art",
            Self::Science => "Science",
        }
    }
}

impl FromStr for Category {
    type Err = BookValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| BookValidationError::UnknownCategory(normalized.to_string()))
    }
}

/// Short recorded observation tied to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub text: String,
    /// Epoch milliseconds. Missing in older snapshots, defaults to `0`.
    #[serde(default)]
    pub created_at: i64,
}

impl Insight {
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            text: text.into(),
            created_at,
        }
    }
}

/// Canonical book record.
///
/// Serialized in camelCase to keep the persisted snapshot shape stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// The user's one-line conclusion about the book.
    pub one_thing: String,
    pub status: BookStatus,
    pub category: Category,
    /// Free-form markdown note body.
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    /// Presentation token for the spine color, e.g. `bg-blue-900`.
    pub cover_color: String,
    /// Epoch milliseconds. Older snapshots stored an ISO-8601 string.
    #[serde(deserialize_with = "deserialize_epoch_ms")]
    pub last_updated: i64,
}

/// Cover color used when the caller does not pick one.
pub const DEFAULT_COVER_COLOR: &str = "bg-blue-900";

impl Book {
    /// Creates an empty `tsundoku` book with a generated id.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: Category,
        cover_color: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            author: author.into(),
            one_thing: String::new(),
            status: BookStatus::Tsundoku,
            category,
            notes: String::new(),
            tags: Vec::new(),
            insights: Vec::new(),
            cover_color: cover_color.into(),
            last_updated: now_ms,
        }
    }

    /// Validates caller-facing invariants.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.id.trim().is_empty() {
            return Err(BookValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        Ok(())
    }

    /// Adds a tag if it is not present yet. Returns whether the list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        if self.tags.iter().any(|existing| *existing == tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes a tag if present. Returns whether the list changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        let target = tag.trim();
        self.tags.retain(|existing| existing != target);
        self.tags.len() != before
    }

    /// Insight texts in recorded order.
    pub fn insight_texts(&self) -> impl Iterator<Item = &str> {
        self.insights.iter().map(|insight| insight.text.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

fn deserialize_epoch_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => Ok(millis),
        RawTimestamp::Text(text) => parse_iso_timestamp(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid lastUpdated timestamp `{text}`"))
        }),
    }
}

/// Parses RFC 3339 (`...Z`, `+09:00`) or offset-less ISO-8601 (read as UTC).
pub fn parse_iso_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Trims one tag. Blank input yields `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims, drops blanks and deduplicates while keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().filter_map(|tag| normalize_tag(tag)) {
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Validation errors for book input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyId,
    EmptyTitle,
    EmptyAuthor,
    UnknownStatus(String),
    UnknownCategory(String),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "book id cannot be empty"),
            Self::EmptyTitle => write!(f, "book title cannot be empty"),
            Self::EmptyAuthor => write!(f, "book author cannot be empty"),
            Self::UnknownStatus(value) => write!(
                f,
                "unknown status `{value}`; expected reading|finished|tsundoku"
            ),
            Self::UnknownCategory(value) => write!(
                f,
                "unknown category `{value}`; expected Business|Novel|Philosophy|Art|Science"
            ),
        }
    }
}

impl Error for BookValidationError {}
