//! Debounced reactive commentary on the active book's note.
//!
//! # Responsibility
//! - Greet when a book becomes active and reset its conversation.
//! - Debounce note edits and classify sufficiently large changes.
//!
//! # Invariants
//! - At most one pending fire exists; a new edit replaces it.
//! - Switching books cancels the pending fire before greeting.
//! - The snapshot length only moves when a comment is emitted.
//! - Time is supplied by the caller; nothing here sleeps or spawns.

use crate::jinnai::conversation::Conversation;
use crate::jinnai::responses::{classify_tone, pick_line};
use crate::model::book::{Book, BookId};
use crate::model::message::ChatMessage;
use crate::model::now_epoch_ms;
use log::debug;
use rand::Rng;
use std::time::{Duration, Instant};

/// Quiet period after the last edit before analysis fires.
pub const QUIET_PERIOD: Duration = Duration::from_secs(3);
/// Minimum absolute character delta (exclusive) that earns a comment.
pub const DELTA_THRESHOLD: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFire {
    due_at: Instant,
    text: String,
}

/// Cancel-and-reschedule timer handle for note edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceTimer {
    pending: Option<PendingFire>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a fire at `now + quiet`, superseding any pending one.
    /// Returns whether a pending fire was replaced.
    pub fn schedule(&mut self, text: impl Into<String>, now: Instant, quiet: Duration) -> bool {
        self.pending
            .replace(PendingFire {
                due_at: now + quiet,
                text: text.into(),
            })
            .is_some()
    }

    /// Drops the pending fire. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due_at)
    }

    /// Takes the pending text once `now` reaches the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(pending) if now >= pending.due_at => self.pending.take().map(|fire| fire.text),
            _ => None,
        }
    }
}

/// Engine state for the active conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentaryState {
    Idle,
    Watching { book_id: BookId },
}

/// Commentary engine bound to one active book at a time.
pub struct CommentarySession<R: Rng> {
    rng: R,
    quiet_period: Duration,
    delta_threshold: usize,
    state: CommentaryState,
    timer: DebounceTimer,
    snapshot_chars: usize,
    conversation: Option<Conversation>,
    clock: fn() -> i64,
}

impl<R: Rng> CommentarySession<R> {
    pub fn new(rng: R) -> Self {
        Self::with_settings(rng, QUIET_PERIOD, DELTA_THRESHOLD)
    }

    pub fn with_settings(rng: R, quiet_period: Duration, delta_threshold: usize) -> Self {
        Self {
            rng,
            quiet_period,
            delta_threshold,
            state: CommentaryState::Idle,
            timer: DebounceTimer::new(),
            snapshot_chars: 0,
            conversation: None,
            clock: now_epoch_ms,
        }
    }

    /// Overrides the epoch-ms clock used for message timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &CommentaryState {
        &self.state
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn conversation_mut(&mut self) -> Option<&mut Conversation> {
        self.conversation.as_mut()
    }

    /// Deadline of the pending analysis, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.due_at()
    }

    /// Activates `book`, emitting a greeting unless it is already active.
    pub fn select_book(&mut self, book: &Book) -> Option<&ChatMessage> {
        if matches!(&self.state, CommentaryState::Watching { book_id } if *book_id == book.id) {
            return None;
        }

        if self.timer.cancel() {
            debug!("event=commentary_cancel module=jinnai status=ok reason=book_switch");
        }
        self.state = CommentaryState::Idle;

        self.conversation = Some(Conversation::opening_for(book, (self.clock)()));
        self.snapshot_chars = book.notes.chars().count();
        self.state = CommentaryState::Watching {
            book_id: book.id.clone(),
        };
        debug!(
            "event=commentary_select module=jinnai status=ok book_id={} snapshot_chars={}",
            book.id, self.snapshot_chars
        );
        self.conversation.as_ref().and_then(Conversation::last)
    }

    /// Returns to idle, dropping any pending analysis and the conversation.
    pub fn deselect(&mut self) {
        self.timer.cancel();
        self.state = CommentaryState::Idle;
        self.conversation = None;
    }

    /// Records a note edit; (re)starts the quiet-period timer.
    pub fn note_edited(&mut self, text: &str, now: Instant) {
        if self.state == CommentaryState::Idle {
            return;
        }
        self.timer.schedule(text, now, self.quiet_period);
    }

    /// Fires the pending analysis if its quiet period has elapsed.
    ///
    /// Returns the emitted message, if the edit delta was large enough.
    pub fn poll(&mut self, now: Instant) -> Option<&ChatMessage> {
        let text = self.timer.poll(now)?;
        let current_chars = text.chars().count();
        let delta = current_chars.abs_diff(self.snapshot_chars);
        if delta <= self.delta_threshold {
            debug!(
                "event=commentary_fire module=jinnai status=skipped delta={} threshold={}",
                delta, self.delta_threshold
            );
            return None;
        }

        let tone = classify_tone(&text, &mut self.rng);
        let line = pick_line(tone, &mut self.rng)?;
        let timestamp = (self.clock)();
        let conversation = self.conversation.as_mut()?;
        conversation.push(ChatMessage::new(line, tone, timestamp));
        self.snapshot_chars = current_chars;
        debug!(
            "event=commentary_fire module=jinnai status=ok delta={} tone={}",
            delta,
            tone.as_str()
        );
        conversation.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{DebounceTimer, QUIET_PERIOD};
    use std::time::{Duration, Instant};

    #[test]
    fn reschedule_replaces_pending_fire() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new();
        assert!(!timer.schedule("a", start, QUIET_PERIOD));
        assert!(timer.schedule("ab", start + Duration::from_secs(2), QUIET_PERIOD));

        assert_eq!(timer.poll(start + Duration::from_secs(3)), None);
        assert_eq!(
            timer.poll(start + Duration::from_secs(5)).as_deref(),
            Some("ab")
        );
        assert!(!timer.is_pending());
    }

    #[test]
    fn cancel_drops_pending_fire() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new();
        timer.schedule("a", start, QUIET_PERIOD);
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert_eq!(timer.poll(start + Duration::from_secs(10)), None);
    }
}
