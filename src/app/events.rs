//! Event processing from backend

use super::{ChatApp, Screen};
use crate::protocol::GuiEvent;

impl ChatApp {
    /// Drain every pending backend event without blocking.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.process_single_event(event);
        }
    }

    fn process_single_event(&mut self, event: GuiEvent) {
        match event {
            GuiEvent::LoginSucceeded(username) => {
                if let Screen::Login(_) = self.screen {
                    self.settings.username = username.clone();
                    self.enter_chat(username);
                }
            }
            GuiEvent::LoginFailed(reason) => {
                tracing::info!(%reason, "login refused");
                if let Screen::Login(view) = &mut self.screen {
                    view.fail(reason);
                }
            }
            GuiEvent::Batch(batch) => match &mut self.screen {
                Screen::Chat(view) => {
                    let outcome = view.apply_batch(batch);
                    if outcome.appended > 0 {
                        tracing::debug!(
                            appended = outcome.appended,
                            cursor = view.sync().cursor(),
                            "merged batch"
                        );
                    }
                }
                // A batch still in flight when the view was left
                Screen::Login(_) => tracing::debug!("dropping batch outside chat"),
            },
            GuiEvent::PollFailed(reason) => {
                if let Screen::Chat(view) = &mut self.screen {
                    view.connection_problem(format!("Connection problem: {}", reason));
                }
            }
            GuiEvent::Malformed(reason) => {
                if let Screen::Chat(view) = &mut self.screen {
                    view.connection_problem(format!("Unexpected server response: {}", reason));
                }
            }
            GuiEvent::SendResult(result) => {
                if self.stale_send_results > 0 {
                    self.stale_send_results -= 1;
                    tracing::debug!(?result, "dropping send result from an earlier session");
                } else if let Screen::Chat(view) = &mut self.screen {
                    view.finish_send(result);
                }
            }
            GuiEvent::LoggedOut => {
                if let Screen::Chat(_) = self.screen {
                    self.enter_login();
                }
            }
            GuiEvent::Error(e) => {
                tracing::error!(error = %e, "backend error");
                match &mut self.screen {
                    Screen::Login(view) => view.fail(e),
                    Screen::Chat(view) => view.show_error(e),
                }
            }
        }
    }
}
