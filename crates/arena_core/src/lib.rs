//! Core domain logic for The Arena reading journal.
//! This crate is the single source of truth for shelf and persona behavior.

pub mod analysis;
pub mod config;
pub mod db;
pub mod jinnai;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::concepts::{tag_concepts, Concept, CONCEPT_DICTIONARY};
pub use analysis::cross_book::{analyze_shelf, CrossAnalysis};
pub use analysis::stats::{reading_stats, ReadingStats};
pub use config::{ArenaConfig, ConfigError};
pub use jinnai::commentary::{CommentarySession, CommentaryState, DebounceTimer};
pub use jinnai::conversation::{Conversation, ConversationScope, ConversationTurn, TurnRole};
pub use jinnai::persona_client::{
    PersonaClient, PersonaContext, PersonaError, PersonaTransport, ReqwestTransport,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::book::{Book, BookId, BookStatus, BookValidationError, Category, Insight};
pub use model::message::{ChatMessage, Evidence, Tone};
pub use repo::kv_repo::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};
pub use repo::snapshot::{load_books, save_books, SnapshotError, BOOKS_STORAGE_KEY};
pub use service::book_service::{BookService, BookServiceError, NewBook};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
