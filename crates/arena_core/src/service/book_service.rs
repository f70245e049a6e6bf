//! Book store use-case service.
//!
//! # Responsibility
//! - Own the in-memory shelf and every mutation applied to it.
//! - Persist the full shelf as one snapshot after each mutation.
//!
//! # Invariants
//! - Book ids are unique across the shelf.
//! - Every effective mutation stamps `last_updated` with the injected clock.
//! - Snapshot write failures are logged and dropped; in-memory state stays authoritative.
//! - Tag operations keep set semantics in insertion order.

use crate::analysis::stats::{reading_stats, ReadingStats};
use crate::model::book::{
    normalize_tags, Book, BookId, BookStatus, BookValidationError, Category, Insight,
    DEFAULT_COVER_COLOR,
};
use crate::model::now_epoch_ms;
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::snapshot::{load_books, save_books};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for book use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookServiceError {
    /// Caller input violates book invariants.
    InvalidInput(BookValidationError),
    /// Target book does not exist.
    BookNotFound(BookId),
    /// Insight text is blank.
    EmptyInsight,
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::EmptyInsight => write!(f, "insight text cannot be empty"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for BookServiceError {
    fn from(value: BookValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Input for adding a book to the shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: Category,
    /// `None` picks `DEFAULT_COVER_COLOR`.
    pub cover_color: Option<String>,
}

/// Book store over an injected key-value backend.
pub struct BookService<S: KeyValueStore> {
    storage: S,
    books: Vec<Book>,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> BookService<S> {
    /// Loads the shelf from `storage` (seed shelf on absent/corrupt data).
    pub fn load(storage: S) -> Self {
        Self::load_with_clock(storage, now_epoch_ms)
    }

    /// Same as [`BookService::load`] with an explicit epoch-ms clock.
    pub fn load_with_clock(mut storage: S, clock: fn() -> i64) -> Self {
        let books = load_books(&mut storage);
        Self {
            storage,
            books,
            clock,
        }
    }

    /// All books in shelf order.
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    /// Books filtered by status, shelf order preserved.
    pub fn list_by_status(&self, status: BookStatus) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| book.status == status)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Aggregate counters over the shelf.
    pub fn stats(&self) -> ReadingStats {
        reading_stats(&self.books)
    }

    /// Backing storage, mainly for inspection in tests.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Adds a new `tsundoku` book at the front of the shelf.
    pub fn create(&mut self, input: NewBook) -> Result<Book, BookServiceError> {
        let cover_color = input
            .cover_color
            .filter(|color| !color.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COVER_COLOR.to_string());
        let book = Book::new(
            input.title.trim(),
            input.author.trim(),
            input.category,
            cover_color,
            (self.clock)(),
        );
        book.validate()?;

        self.books.insert(0, book.clone());
        info!(
            "event=book_create module=service status=ok book_id={} category={}",
            book.id,
            book.category.as_str()
        );
        self.persist();
        Ok(book)
    }

    /// Replaces the note body.
    pub fn update_note(
        &mut self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<Book, BookServiceError> {
        let content = content.into();
        self.mutate(id, "note", |book| {
            book.notes = content;
            true
        })
    }

    pub fn update_status(&mut self, id: &str, status: BookStatus) -> Result<Book, BookServiceError> {
        self.mutate(id, "status", |book| {
            book.status = status;
            true
        })
    }

    /// Replaces the one-line takeaway.
    pub fn update_one_thing(
        &mut self,
        id: &str,
        one_thing: impl Into<String>,
    ) -> Result<Book, BookServiceError> {
        let one_thing = one_thing.into();
        self.mutate(id, "one_thing", |book| {
            book.one_thing = one_thing;
            true
        })
    }

    /// Replaces the full tag set (trimmed, blanks dropped, deduplicated).
    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<Book, BookServiceError> {
        let normalized = normalize_tags(&tags);
        self.mutate(id, "tags", |book| {
            book.tags = normalized;
            true
        })
    }

    /// Adds one tag; existing tags leave the book untouched.
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<Book, BookServiceError> {
        self.mutate(id, "tag_add", |book| book.add_tag(tag))
    }

    /// Removes one tag; missing tags leave the book untouched.
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<Book, BookServiceError> {
        self.mutate(id, "tag_remove", |book| book.remove_tag(tag))
    }

    /// Records one insight used by the cross-book analyzer.
    pub fn add_insight(&mut self, id: &str, text: &str) -> Result<Book, BookServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BookServiceError::EmptyInsight);
        }
        let created_at = (self.clock)();
        self.mutate(id, "insight_add", |book| {
            book.insights.push(Insight::new(text, created_at));
            true
        })
    }

    /// Removes a book and returns it.
    pub fn delete(&mut self, id: &str) -> Result<Book, BookServiceError> {
        let index = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| BookServiceError::BookNotFound(id.to_string()))?;
        let removed = self.books.remove(index);
        info!(
            "event=book_delete module=service status=ok book_id={}",
            removed.id
        );
        self.persist();
        Ok(removed)
    }

    fn mutate(
        &mut self,
        id: &str,
        field: &str,
        apply: impl FnOnce(&mut Book) -> bool,
    ) -> Result<Book, BookServiceError> {
        let now = (self.clock)();
        let book = self
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookServiceError::BookNotFound(id.to_string()))?;

        if !apply(book) {
            return Ok(book.clone());
        }
        book.last_updated = now;
        let updated = book.clone();

        info!(
            "event=book_update module=service status=ok book_id={} field={}",
            updated.id, field
        );
        self.persist();
        Ok(updated)
    }

    fn persist(&mut self) {
        if let Err(err) = save_books(&mut self.storage, &self.books) {
            error!(
                "event=snapshot_save module=service status=error error_code=snapshot_write_failed error={}",
                err
            );
        }
    }
}
