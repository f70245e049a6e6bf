//! Text analysis over the shelf.
//!
//! # Responsibility
//! - Tag free text with concepts from a fixed dictionary.
//! - Find concepts shared across books and pick a provocation.
//! - Compute reading statistics.
//!
//! # Invariants
//! - All routines are pure except for injected randomness.

pub mod concepts;
pub mod cross_book;
pub mod stats;
