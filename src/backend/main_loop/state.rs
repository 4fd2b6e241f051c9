//! State owned by the backend thread.

use crossbeam_channel::Sender;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{ChatBackend, SyncOptions};
use crate::protocol::GuiEvent;

/// Sync loop states. `Submitting` runs on separate tasks and never blocks
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next tick
    Idle,
    /// A read request is outstanding
    Polling,
}

/// A running poll task and the token that stops it.
pub struct Poller {
    pub cancel: CancellationToken,
    pub handle: JoinHandle<()>,
}

impl Poller {
    /// Cancel the task and wait until it has exited, so nothing it produced
    /// can arrive after the caller's next event.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("poll task ended abnormally: {}", e);
        }
    }
}

/// Everything the action handlers need.
pub struct BackendContext {
    pub backend: Arc<dyn ChatBackend>,
    pub options: SyncOptions,
    pub event_tx: Sender<GuiEvent>,
    /// Root token; cancelled on shutdown and parent of every task token
    pub shutdown: CancellationToken,
    pub poller: Option<Poller>,
}

impl BackendContext {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        options: SyncOptions,
        event_tx: Sender<GuiEvent>,
    ) -> Self {
        Self {
            backend,
            options,
            event_tx,
            shutdown: CancellationToken::new(),
            poller: None,
        }
    }

    pub async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
            tracing::debug!("poll task stopped");
        }
    }
}
