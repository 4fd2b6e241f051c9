//! Backend thread: action dispatch, poll task and send tasks.

pub mod handlers;
pub mod poller;
pub mod state;

use self::state::BackendContext;
use crate::backend::{ChatBackend, SyncOptions};
use crate::protocol::{BackendAction, GuiEvent};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// How often the action queue is checked when idle
const ACTION_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the backend event loop on a tokio runtime. Blocks until a
/// `Shutdown` action arrives or the UI drops its sender.
pub fn run_backend(
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
    backend: Arc<dyn ChatBackend>,
    options: SyncOptions,
) {
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    rt.block_on(async move {
        let mut ctx = BackendContext::new(backend, options, event_tx);

        'outer: loop {
            // Check for actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(action) => {
                        if !handlers::handle_backend_action(action, &mut ctx).await {
                            break 'outer;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::debug!("UI hung up, stopping backend");
                        ctx.stop_polling().await;
                        ctx.shutdown.cancel();
                        break 'outer;
                    }
                }
            }

            tokio::time::sleep(ACTION_POLL_INTERVAL).await;
        }
    });
}
