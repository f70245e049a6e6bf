//! Chat message model.
//!
//! # Responsibility
//! - Define the immutable message record shown in persona conversations.
//! - Map message tones to remote-model turn roles.
//!
//! # Invariants
//! - Fields are private; a message cannot be mutated after creation.
//! - `tone` decides rendering treatment and is fixed at creation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a message; picks its canned pool and visual treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Challenge / devil's advocate.
    Devil,
    /// Lateral connection to an unrelated field.
    Serendipity,
    /// Demand for a concrete action.
    Action,
    /// Plain persona remark.
    Normal,
    /// Authored by the user.
    User,
    /// Result of the cross-book analyzer.
    CrossAnalysis,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Devil => "devil",
            Self::Serendipity => "serendipity",
            Self::Action => "action",
            Self::Normal => "normal",
            Self::User => "user",
            Self::CrossAnalysis => "cross_analysis",
        }
    }
}

/// One (book title, insight text) pair attached as analyzer evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub book_title: String,
    pub insight: String,
}

/// Immutable chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: String,
    text: String,
    tone: Tone,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    evidence: Vec<Evidence>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, tone: Tone, timestamp: i64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), text, tone, timestamp)
    }

    /// Creates a message with a caller-provided id (greetings use stable ids).
    pub fn with_id(
        id: impl Into<String>,
        text: impl Into<String>,
        tone: Tone,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            tone,
            timestamp,
            evidence: Vec::new(),
        }
    }

    /// Creates a cross-analysis message carrying its evidence.
    pub fn cross_analysis(text: impl Into<String>, evidence: Vec<Evidence>, timestamp: i64) -> Self {
        Self {
            evidence,
            ..Self::new(text, Tone::CrossAnalysis, timestamp)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }
}
