//! Message log owned by the chat view.
//!
//! `SyncState` is only ever mutated from the UI thread. The poll task
//! produces batches and hands them over; `merge` is the single place where
//! the log and the cursor move.
//!
//! The cursor here is read once, when polling starts. From then on the poll
//! task advances a private copy for its requests and never reports it back,
//! so this cursor only records how far the merged log reaches. Each chat
//! session gets a fresh `SyncState`, which is why polling always starts
//! from `CURSOR_START` and refetches the whole stream.

use std::collections::HashSet;

use crate::protocol::Message;

/// Cursor value meaning "from the beginning of the stream"
pub const CURSOR_START: &str = "0";

/// Result of merging one batch into the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Messages appended to the log
    pub appended: usize,
    /// Messages dropped because their id was already in the log
    pub duplicates: usize,
    /// The viewport should jump to the bottom
    pub scroll: bool,
}

#[derive(Debug, Clone)]
pub struct SyncState {
    messages: Vec<Message>,
    cursor: String,
    seen: HashSet<String>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            cursor: CURSOR_START.to_string(),
            seen: HashSet::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a polled batch. The cursor moves to the last id the backend
    /// returned; an empty batch leaves everything untouched.
    pub fn merge(&mut self, batch: Vec<Message>) -> MergeOutcome {
        let before = self.messages.len();
        let mut outcome = MergeOutcome::default();

        if let Some(last) = batch.last() {
            self.cursor = last.id.clone();
        }

        for message in batch {
            if self.seen.insert(message.id.clone()) {
                self.messages.push(message);
                outcome.appended += 1;
            } else {
                tracing::debug!(id = %message.id, "dropping already-seen message");
                outcome.duplicates += 1;
            }
        }

        // Scroll on count change only; edits to existing content do not move
        // the viewport.
        outcome.scroll = self.messages.len() != before;
        outcome
    }
}
