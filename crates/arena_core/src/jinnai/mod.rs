//! The Jinnai persona: reactive commentary and remote replies.
//!
//! # Responsibility
//! - Hold the persona's canned voice (pools, triggers, greetings).
//! - Drive debounced note commentary per active book.
//! - Talk to the hosted generative-language API with local fallbacks.
//!
//! # Invariants
//! - No path here surfaces an error to the user; failures degrade to canned text.

pub mod commentary;
pub mod conversation;
pub mod persona_client;
pub mod responses;
