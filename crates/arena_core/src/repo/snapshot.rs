//! Book snapshot encoding and load/save boundaries.
//!
//! # Responsibility
//! - Encode/decode the full book list as one JSON array.
//! - Apply the load fallback policy (seed shelf on absent/empty/malformed).
//!
//! # Invariants
//! - `decode_snapshot` accepts only non-empty arrays with unique book ids.
//! - `load_books` never fails; corrupt entries are cleared and logged.
//! - `save_books` writes the whole list under `BOOKS_STORAGE_KEY`.

use crate::model::book::Book;
use crate::repo::kv_repo::{KeyValueStore, StoreError};
use crate::repo::seed::seed_books;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized book list.
pub const BOOKS_STORAGE_KEY: &str = "jinnai_books";

/// Snapshot codec/persistence error.
#[derive(Debug)]
pub enum SnapshotError {
    /// Blob is not a JSON array of books.
    Malformed(serde_json::Error),
    /// Blob decoded to an empty array.
    Empty,
    /// Two books share one id.
    DuplicateId(String),
    /// Underlying key-value store failed.
    Store(StoreError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed book snapshot: {err}"),
            Self::Empty => write!(f, "book snapshot is empty"),
            Self::DuplicateId(id) => write!(f, "book snapshot has duplicate id `{id}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Empty | Self::DuplicateId(_) => None,
        }
    }
}

impl From<StoreError> for SnapshotError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Serializes the full book list.
pub fn encode_snapshot(books: &[Book]) -> Result<String, SnapshotError> {
    serde_json::to_string(books).map_err(SnapshotError::Malformed)
}

/// Parses a stored blob back into books.
pub fn decode_snapshot(raw: &str) -> Result<Vec<Book>, SnapshotError> {
    let books: Vec<Book> = serde_json::from_str(raw).map_err(SnapshotError::Malformed)?;
    if books.is_empty() {
        return Err(SnapshotError::Empty);
    }

    let mut seen = BTreeSet::new();
    for book in &books {
        if !seen.insert(book.id.as_str()) {
            return Err(SnapshotError::DuplicateId(book.id.clone()));
        }
    }
    Ok(books)
}

/// Loads books from storage, falling back to the seed shelf.
///
/// # Side effects
/// - Removes the stored entry when it cannot be decoded.
/// - Emits `snapshot_load` logging events.
pub fn load_books<S: KeyValueStore + ?Sized>(store: &mut S) -> Vec<Book> {
    let raw = match store.get(BOOKS_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=snapshot_load module=repo status=ok source=seed reason=absent");
            return seed_books();
        }
        Err(err) => {
            error!(
                "event=snapshot_load module=repo status=error source=seed error_code=store_read_failed error={}",
                err
            );
            return seed_books();
        }
    };

    match decode_snapshot(&raw) {
        Ok(books) => {
            info!(
                "event=snapshot_load module=repo status=ok source=store count={}",
                books.len()
            );
            books
        }
        Err(SnapshotError::Empty) => {
            info!("event=snapshot_load module=repo status=ok source=seed reason=empty");
            seed_books()
        }
        Err(err) => {
            error!(
                "event=snapshot_load module=repo status=error source=seed error_code=snapshot_corrupt error={}",
                err
            );
            if let Err(remove_err) = store.remove(BOOKS_STORAGE_KEY) {
                warn!(
                    "event=snapshot_clear module=repo status=error error={}",
                    remove_err
                );
            }
            seed_books()
        }
    }
}

/// Writes the full book list as one snapshot.
pub fn save_books<S: KeyValueStore + ?Sized>(
    store: &mut S,
    books: &[Book],
) -> Result<(), SnapshotError> {
    let encoded = encode_snapshot(books)?;
    store.set(BOOKS_STORAGE_KEY, &encoded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, encode_snapshot, SnapshotError};
    use crate::repo::seed::seed_books;

    #[test]
    fn decode_rejects_empty_array() {
        assert!(matches!(decode_snapshot("[]"), Err(SnapshotError::Empty)));
    }

    #[test]
    fn decode_rejects_non_array() {
        assert!(matches!(
            decode_snapshot("{\"id\":\"1\"}"),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let mut books = seed_books();
        books[1].id = books[0].id.clone();
        let raw = encode_snapshot(&books).unwrap();
        assert!(matches!(
            decode_snapshot(&raw),
            Err(SnapshotError::DuplicateId(id)) if id == "1"
        ));
    }
}
