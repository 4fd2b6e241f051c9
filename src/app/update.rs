//! Key handling, drawing and the terminal loop

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::Frame;

use super::{ChatApp, Screen};
use crate::commands::{parse_local_command, LocalCommand, HELP_TEXT};
use crate::protocol::BackendAction;
use crate::terminal::Tui;
use crate::ui::chat::ChatAction;
use crate::ui::login::LoginAction;
use crate::validation::{sanitize_message, validate_message};

/// How long to wait for a key before checking backend events again
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl ChatApp {
    /// Draw, read input and process backend events until the user quits.
    pub fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .context("Failed to draw frame")?;

            if event::poll(INPUT_POLL_INTERVAL).context("Failed to poll terminal events")? {
                if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.process_events();
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        match &mut self.screen {
            Screen::Login(view) => view.draw(frame, &self.theme),
            Screen::Chat(view) => view.draw(frame),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.screen {
            Screen::Login(view) => match view.handle_key(key) {
                LoginAction::Submit { username, password } => {
                    tracing::info!(%username, "logging in");
                    self.send_action(BackendAction::Login { username, password });
                }
                LoginAction::Quit => self.should_quit = true,
                LoginAction::None => {}
            },
            Screen::Chat(view) => match view.handle_key(key) {
                ChatAction::Submit(text) => self.submit(text),
                ChatAction::Quit => self.should_quit = true,
                ChatAction::None => {}
            },
        }
    }

    /// Handle a submitted line: local commands stay here, everything else
    /// goes to the backend. The message appears only once a poll returns it.
    pub fn submit(&mut self, text: String) {
        let Screen::Chat(view) = &mut self.screen else {
            return;
        };

        match parse_local_command(&text) {
            Some(LocalCommand::Quit) => {
                self.should_quit = true;
                return;
            }
            Some(LocalCommand::Logout) => {
                self.send_action(BackendAction::Logout);
                return;
            }
            Some(LocalCommand::Help) => {
                view.show_info(HELP_TEXT);
                return;
            }
            None => {}
        }

        if let Err(e) = validate_message(&text) {
            view.show_error(e);
            return;
        }
        view.begin_send();
        self.send_action(BackendAction::SendMessage(sanitize_message(&text)));
    }
}
