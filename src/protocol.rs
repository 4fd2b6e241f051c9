use serde::{Deserialize, Serialize};

/// Who produced a message; selects the rendering template.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    User,
    System,
}

/// A chat message as delivered by the backend. Read-only to the client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub author: String,
    /// Backend-formatted timestamp, displayed verbatim
    pub time: String,
    /// Raw markup text (untrusted)
    pub content: String,
    #[serde(default, alias = "type")]
    pub kind: MessageKind,
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Authenticate with the chat backend
    Login { username: String, password: String },
    /// Start polling for messages after `cursor` (replaces any running poller)
    StartPolling { cursor: String },
    /// Stop polling and drop the session
    Logout,
    /// Ask the backend to persist a message
    SendMessage(String),
    /// Stop every task and exit the backend thread
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// Credentials accepted for the given username
    LoginSucceeded(String),
    /// Credentials rejected or the backend was unreachable
    LoginFailed(String),
    /// One poll cycle worth of messages (possibly empty)
    Batch(Vec<Message>),
    /// A poll cycle failed; the next cycle retries
    PollFailed(String),
    /// The backend answered with something that is not a message list
    Malformed(String),
    /// Outcome of a `SendMessage` action
    SendResult(Result<(), String>),
    /// Polling stopped and the session was cleared
    LoggedOut,
    /// Backend-level failure not tied to a single request
    Error(String),
}
