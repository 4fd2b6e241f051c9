/// Backend submodules for the chat service and the sync loop
///
/// - `memory`: in-process room used offline and in tests
/// - `http`: JSON over HTTP client for a remote room
/// - `main_loop`: backend thread, poll task and send tasks
mod http;
mod main_loop;
mod memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;
use crate::protocol::Message;

pub use http::HttpBackend;
pub use main_loop::run_backend;
pub use memory::MemoryBackend;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("not logged in")]
    Unauthorized,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
}

/// The chat service the client talks to.
///
/// `read_messages` must return only messages strictly after `cursor`, in
/// stream order.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn read_messages(&self, cursor: &str) -> Result<Vec<Message>, BackendError>;

    async fn write_message(&self, content: &str) -> Result<(), BackendError>;

    /// Returns `Ok(false)` when the credentials are refused.
    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError>;

    fn is_authenticated(&self) -> bool;

    fn logout(&self);
}

/// Timing knobs for the backend thread.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SyncOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            request_timeout: settings.request_timeout(),
        }
    }
}
