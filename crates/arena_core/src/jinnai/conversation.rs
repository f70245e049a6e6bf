//! Append-only persona conversations.
//!
//! # Invariants
//! - Messages are only appended, never edited.
//! - A conversation is scoped to one book or to the global thread.

use crate::jinnai::responses::{greeting_for, GLOBAL_OPENER};
use crate::model::book::{Book, BookId};
use crate::model::message::{ChatMessage, Tone};
use serde::{Deserialize, Serialize};

/// Which thread a conversation belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationScope {
    Book(BookId),
    Global,
}

/// Speaker role understood by the remote model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One prior exchange passed to the remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    scope: ConversationScope,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Book thread starting with the given greeting.
    pub fn for_book(book_id: impl Into<BookId>, greeting: ChatMessage) -> Self {
        Self {
            scope: ConversationScope::Book(book_id.into()),
            messages: vec![greeting],
        }
    }

    /// Book thread opened by the persona's greeting for `book`.
    pub fn opening_for(book: &Book, timestamp: i64) -> Self {
        let greeting = ChatMessage::with_id(
            format!("start-{}", book.id),
            greeting_for(book),
            Tone::Devil,
            timestamp,
        );
        Self::for_book(book.id.clone(), greeting)
    }

    /// Global thread starting with the fixed opener.
    pub fn global(timestamp: i64) -> Self {
        Self {
            scope: ConversationScope::Global,
            messages: vec![ChatMessage::with_id(
                "init",
                GLOBAL_OPENER,
                Tone::Normal,
                timestamp,
            )],
        }
    }

    pub fn scope(&self) -> &ConversationScope {
        &self.scope
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Appends a user-authored message and returns it.
    pub fn push_user(&mut self, text: impl Into<String>, timestamp: i64) -> &ChatMessage {
        self.messages
            .push(ChatMessage::new(text, Tone::User, timestamp));
        &self.messages[self.messages.len() - 1]
    }

    /// Most recent `limit` messages as remote-model turns.
    pub fn history_turns(&self, limit: usize) -> Vec<ConversationTurn> {
        let skip = self.messages.len().saturating_sub(limit);
        self.messages
            .iter()
            .skip(skip)
            .map(|message| {
                let role = match message.tone() {
                    Tone::User => TurnRole::User,
                    _ => TurnRole::Model,
                };
                ConversationTurn::new(role, message.text())
            })
            .collect()
    }
}
