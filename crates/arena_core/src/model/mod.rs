//! Domain model for the reading journal.
//!
//! # Responsibility
//! - Define the book record owned by the book store.
//! - Define chat messages produced by the persona and analyzers.
//!
//! # Invariants
//! - Every book is identified by a unique `BookId`.
//! - Chat messages are immutable once created; their tone never changes.

pub mod book;
pub mod message;

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
