//! In-process chat room.
//!
//! Messages get sequential numeric ids, so `read_messages` can honor the
//! cursor contract exactly. Used for offline mode and by the tests.

use async_trait::async_trait;
use chrono::Local;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{BackendError, ChatBackend};
use crate::protocol::{Message, MessageKind};

/// Author name used for room announcements
const SYSTEM_AUTHOR: &str = "system";

#[derive(Default)]
struct Room {
    messages: Vec<Message>,
    next_id: u64,
    /// Registered accounts (username -> password)
    accounts: HashMap<String, String>,
    session: Option<String>,
    /// Number of upcoming reads that fail with a network error
    failing_reads: usize,
    failing_writes: usize,
}

#[derive(Default)]
pub struct MemoryBackend {
    room: Mutex<Room>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room pre-populated with a short markup tour, for offline use.
    pub fn with_welcome() -> Self {
        let backend = Self::new();
        backend.post_system("Welcome to the [b]offline[/b] room. Nothing here leaves this machine.");
        backend.post_system(
            "Try [i]italic[/i], [u]underline[/u], [quote]quotes[/quote], [code]code[/code] \
             and [color=orange]colors[/color]. Type /help for commands.",
        );
        backend
    }

    /// Register an account that requires a password.
    pub fn with_account(self, username: &str, password: &str) -> Self {
        self.room
            .lock()
            .accounts
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Start with an open session, as if a previous login were restored.
    pub fn with_session(self, username: &str) -> Self {
        self.room.lock().session = Some(username.to_string());
        self
    }

    /// Append a message from another participant.
    pub fn post(&self, author: &str, content: &str) -> Message {
        self.append(author, content, MessageKind::User)
    }

    /// Append a room announcement.
    pub fn post_system(&self, content: &str) -> Message {
        self.append(SYSTEM_AUTHOR, content, MessageKind::System)
    }

    /// Make the next `count` reads fail.
    pub fn fail_next_reads(&self, count: usize) {
        self.room.lock().failing_reads = count;
    }

    /// Make the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.room.lock().failing_writes = count;
    }

    pub fn message_count(&self) -> usize {
        self.room.lock().messages.len()
    }

    fn append(&self, author: &str, content: &str, kind: MessageKind) -> Message {
        let mut room = self.room.lock();
        room.next_id += 1;
        let message = Message {
            id: room.next_id.to_string(),
            author: author.to_string(),
            time: Local::now().format("%H:%M:%S").to_string(),
            content: content.to_string(),
            kind,
        };
        room.messages.push(message.clone());
        message
    }
}

#[async_trait]
impl ChatBackend for MemoryBackend {
    async fn read_messages(&self, cursor: &str) -> Result<Vec<Message>, BackendError> {
        let mut room = self.room.lock();
        if room.session.is_none() {
            return Err(BackendError::Unauthorized);
        }
        if room.failing_reads > 0 {
            room.failing_reads -= 1;
            return Err(BackendError::Network("simulated read failure".into()));
        }
        let after: u64 = cursor
            .parse()
            .map_err(|_| BackendError::Rejected(format!("invalid cursor '{}'", cursor)))?;

        // Ids are sequential starting at 1, so the slice after `after` is
        // exactly the unseen tail.
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(room.messages.len());
        Ok(room.messages[start..].to_vec())
    }

    async fn write_message(&self, content: &str) -> Result<(), BackendError> {
        let author = {
            let mut room = self.room.lock();
            let Some(author) = room.session.clone() else {
                return Err(BackendError::Unauthorized);
            };
            if room.failing_writes > 0 {
                room.failing_writes -= 1;
                return Err(BackendError::Network("simulated write failure".into()));
            }
            author
        };
        if content.trim().is_empty() {
            return Err(BackendError::Rejected("empty message".into()));
        }
        self.append(&author, content, MessageKind::User);
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError> {
        let mut room = self.room.lock();
        if username.is_empty() {
            return Ok(false);
        }
        let accepted = match room.accounts.get(username) {
            Some(expected) => expected == password,
            // Unregistered names get anonymous access without a password
            None => password.is_empty(),
        };
        if accepted {
            room.session = Some(username.to_string());
        }
        Ok(accepted)
    }

    fn is_authenticated(&self) -> bool {
        self.room.lock().session.is_some()
    }

    fn logout(&self) {
        self.room.lock().session = None;
    }
}
