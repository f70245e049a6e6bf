//! Persistence layer for the local journal state.
//!
//! # Responsibility
//! - Define the key-value storage contract standing in for browser local storage.
//! - Encode/decode the single book snapshot blob as pure functions.
//!
//! # Invariants
//! - All books live under one key (`BOOKS_STORAGE_KEY`) as one JSON array.
//! - Snapshot decode never panics; malformed input is a typed error.

pub mod kv_repo;
pub mod seed;
pub mod snapshot;
