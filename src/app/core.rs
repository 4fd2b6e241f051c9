//! Core ChatApp struct definition and initialization

use crossbeam_channel::{Receiver, Sender};

use crate::config::Settings;
use crate::markup::Renderer;
use crate::protocol::{BackendAction, GuiEvent};
use crate::ui::chat::ChatView;
use crate::ui::login::LoginView;
use crate::ui::theme::ChatTheme;

pub enum Screen {
    Login(LoginView),
    Chat(ChatView),
}

pub struct ChatApp {
    pub screen: Screen,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,

    // Persisted settings (server, username, colors, history)
    pub settings: Settings,

    pub theme: ChatTheme,

    pub should_quit: bool,

    /// Send results still owed to a chat view that has been left. They are
    /// dropped on arrival instead of reaching the next session's view.
    pub(super) stale_send_results: usize,
}

impl ChatApp {
    /// Build the app. `authenticated` is the backend's session state at
    /// startup and picks the first screen; it is not consulted again.
    pub fn new(
        action_tx: Sender<BackendAction>,
        event_rx: Receiver<GuiEvent>,
        settings: Settings,
        authenticated: bool,
    ) -> Self {
        let login = LoginView::new(settings.username.clone());
        let mut app = Self {
            screen: Screen::Login(login),
            action_tx,
            event_rx,
            settings,
            theme: ChatTheme::default(),
            should_quit: false,
            stale_send_results: 0,
        };

        if authenticated {
            let username = app.settings.username.clone();
            app.enter_chat(username);
        }
        app
    }

    pub(super) fn send_action(&mut self, action: BackendAction) {
        if self.action_tx.send(action).is_err() {
            tracing::error!("backend thread is gone");
            match &mut self.screen {
                Screen::Login(view) => view.fail("Backend stopped"),
                Screen::Chat(view) => view.show_error("Backend stopped"),
            }
        }
    }

    /// Switch to a fresh chat view and start polling from its cursor.
    pub(super) fn enter_chat(&mut self, username: String) {
        tracing::info!(%username, "entering chat");
        let renderer = Renderer::new(self.settings.colors.clone());
        let view = ChatView::new(
            username,
            renderer,
            self.theme.clone(),
            self.settings.history.clone(),
        );
        let cursor = view.sync().cursor().to_string();
        self.screen = Screen::Chat(view);
        self.send_action(BackendAction::StartPolling { cursor });
    }

    /// Back to the login screen. Input history survives the switch.
    pub(super) fn enter_login(&mut self) {
        self.save_history();
        if let Screen::Chat(view) = &self.screen {
            self.stale_send_results += view.pending_sends();
        }
        let view = LoginView::new(self.settings.username.clone());
        self.screen = Screen::Login(view);
    }

    fn save_history(&mut self) {
        if let Screen::Chat(view) = &self.screen {
            let history = view.input.history.clone();
            self.settings.set_history(&history);
        }
    }

    /// Stop the backend and hand back the settings to persist.
    pub fn shutdown(mut self) -> Settings {
        self.save_history();
        // The backend may already be gone; nothing left to report to
        let _ = self.action_tx.send(BackendAction::Shutdown);
        self.settings
    }
}
