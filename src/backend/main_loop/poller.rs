//! Background poll task.

use crossbeam_channel::{Sender, TrySendError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use super::state::PollState;
use crate::backend::{BackendError, ChatBackend, SyncOptions};
use crate::protocol::GuiEvent;

/// Wait between attempts when the UI queue is full
const BACKPRESSURE_RETRY: Duration = Duration::from_millis(20);

/// Hand an event to the UI, waiting while the bounded queue is full.
/// Returns false if the UI is gone or `cancel` fired first.
pub async fn deliver(
    event_tx: &Sender<GuiEvent>,
    mut event: GuiEvent,
    cancel: &CancellationToken,
) -> bool {
    loop {
        match event_tx.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Full(returned)) => {
                event = returned;
                tokio::select! {
                    _ = cancel.cancelled() => return false,
                    _ = sleep(BACKPRESSURE_RETRY) => {}
                }
            }
            Err(TrySendError::Disconnected(_)) => return false,
        }
    }
}

/// Map one read result to the event the UI sees, advancing `cursor` on a
/// non-empty batch.
pub fn poll_event(
    result: Result<Result<Vec<crate::protocol::Message>, BackendError>, tokio::time::error::Elapsed>,
    cursor: &mut String,
) -> GuiEvent {
    match result {
        Ok(Ok(batch)) => {
            if let Some(last) = batch.last() {
                *cursor = last.id.clone();
            }
            GuiEvent::Batch(batch)
        }
        Ok(Err(BackendError::Malformed(reason))) => GuiEvent::Malformed(reason),
        Ok(Err(e)) => GuiEvent::PollFailed(e.to_string()),
        Err(_) => GuiEvent::PollFailed(BackendError::Timeout.to_string()),
    }
}

/// Poll `backend` every interval starting after `cursor` until cancelled.
/// Every cycle produces exactly one event.
pub async fn poll_loop(
    backend: Arc<dyn ChatBackend>,
    mut cursor: String,
    options: SyncOptions,
    event_tx: Sender<GuiEvent>,
    cancel: CancellationToken,
) {
    let mut state = PollState::Idle;
    tracing::info!(%cursor, "polling started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(options.poll_interval) => {}
        }

        state = PollState::Polling;
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = timeout(options.request_timeout, backend.read_messages(&cursor)) => result,
        };
        state = PollState::Idle;

        let event = poll_event(result, &mut cursor);
        match &event {
            GuiEvent::Batch(batch) if !batch.is_empty() => {
                tracing::debug!(count = batch.len(), %cursor, "batch received");
            }
            GuiEvent::PollFailed(reason) | GuiEvent::Malformed(reason) => {
                tracing::warn!("poll failed, retrying next cycle: {}", reason);
            }
            _ => {}
        }

        if !deliver(&event_tx, event, &cancel).await {
            break;
        }
    }

    tracing::info!(?state, %cursor, "polling stopped");
}
