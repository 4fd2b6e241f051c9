//! Handlers for actions coming from the UI.

use tokio::time::timeout;

use super::poller::{deliver, poll_loop};
use super::state::{BackendContext, Poller};
use crate::backend::BackendError;
use crate::protocol::{BackendAction, GuiEvent};

/// Handle one action from the UI. Returns false once the backend should exit.
pub async fn handle_backend_action(action: BackendAction, ctx: &mut BackendContext) -> bool {
    match action {
        BackendAction::Login { username, password } => {
            // A new login always starts from a clean slate
            ctx.stop_polling().await;

            let event = match timeout(
                ctx.options.request_timeout,
                ctx.backend.login(&username, &password),
            )
            .await
            {
                Ok(Ok(true)) => {
                    tracing::info!(%username, "login accepted");
                    GuiEvent::LoginSucceeded(username)
                }
                Ok(Ok(false)) => {
                    tracing::info!(%username, "login refused");
                    GuiEvent::LoginFailed("Invalid username or password".into())
                }
                Ok(Err(e)) => {
                    tracing::warn!("login failed: {}", e);
                    GuiEvent::LoginFailed(format!("Login failed: {}", e))
                }
                Err(_) => GuiEvent::LoginFailed(format!("Login failed: {}", BackendError::Timeout)),
            };
            deliver(&ctx.event_tx, event, &ctx.shutdown).await
        }

        BackendAction::StartPolling { cursor } => {
            ctx.stop_polling().await;
            let cancel = ctx.shutdown.child_token();
            let handle = tokio::spawn(poll_loop(
                ctx.backend.clone(),
                cursor,
                ctx.options,
                ctx.event_tx.clone(),
                cancel.clone(),
            ));
            ctx.poller = Some(Poller { cancel, handle });
            true
        }

        BackendAction::Logout => {
            ctx.stop_polling().await;
            ctx.backend.logout();
            tracing::info!("logged out");
            deliver(&ctx.event_tx, GuiEvent::LoggedOut, &ctx.shutdown).await
        }

        BackendAction::SendMessage(content) => {
            let backend = ctx.backend.clone();
            let event_tx = ctx.event_tx.clone();
            let shutdown = ctx.shutdown.clone();
            let request_timeout = ctx.options.request_timeout;

            // Sends run on their own task so a slow write never delays polling
            tokio::spawn(async move {
                let result = match timeout(request_timeout, backend.write_message(&content)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(BackendError::Timeout.to_string()),
                };
                if let Err(reason) = &result {
                    tracing::warn!("send failed: {}", reason);
                }
                deliver(&event_tx, GuiEvent::SendResult(result), &shutdown).await;
            });
            true
        }

        BackendAction::Shutdown => {
            ctx.stop_polling().await;
            ctx.shutdown.cancel();
            false
        }
    }
}
