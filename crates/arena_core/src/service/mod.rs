//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate shelf mutations and snapshot persistence.
//! - Keep CLI callers decoupled from storage details.

pub mod book_service;
