//! Login screen: username and masked password.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme::ChatTheme;
use crate::validation::{validate_username, MAX_USERNAME_CHARS};

pub const LOGIN_PROMPT: &str = "Login or enter an username for anon access";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Submit { username: String, password: String },
    Quit,
}

#[derive(Debug)]
pub struct LoginView {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// A login request is in flight; input is ignored until it resolves
    pub submitting: bool,
}

impl LoginView {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        // Jump straight to the password when the name is remembered
        let focus = if username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        Self {
            username,
            password: String::new(),
            focus,
            error: None,
            submitting: false,
        }
    }

    /// The backend refused the credentials. The entered name is kept.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.submitting = false;
        self.password.clear();
        self.error = Some(reason.into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return LoginAction::Quit;
        }
        if self.submitting {
            return LoginAction::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.next();
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(c) => {
                if self.focus == LoginField::Username
                    && self.username.chars().count() >= MAX_USERNAME_CHARS
                {
                    return LoginAction::None;
                }
                self.field_mut().push(c);
            }
            _ => {}
        }
        LoginAction::None
    }

    fn submit(&mut self) -> LoginAction {
        let username = self.username.trim().to_string();
        if let Err(e) = validate_username(&username) {
            self.error = Some(e);
            self.focus = LoginField::Username;
            return LoginAction::None;
        }
        self.error = None;
        self.submitting = true;
        LoginAction::Submit {
            username,
            password: self.password.clone(),
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn draw(&self, frame: &mut Frame, theme: &ChatTheme) {
        let [form] = Layout::vertical([Constraint::Length(9)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [form] = Layout::horizontal([Constraint::Length(48)])
            .flex(Flex::Center)
            .areas(form);

        let [prompt, user_area, pass_area, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(form);

        frame.render_widget(
            Paragraph::new(LOGIN_PROMPT).alignment(Alignment::Center),
            prompt,
        );

        let masked = "*".repeat(self.password.chars().count());
        self.draw_field(frame, theme, user_area, "Username", &self.username, LoginField::Username);
        self.draw_field(frame, theme, pass_area, "Password", &masked, LoginField::Password);

        let status_line = if let Some(err) = &self.error {
            Line::from(Span::styled(err.as_str(), theme.error))
        } else if self.submitting {
            Line::from(Span::styled("Logging in...", theme.info))
        } else {
            Line::from(Span::styled("Enter to log in, Esc to quit", theme.placeholder))
        };
        frame.render_widget(Paragraph::new(status_line).alignment(Alignment::Center), status);
    }

    fn draw_field(
        &self,
        frame: &mut Frame,
        theme: &ChatTheme,
        area: Rect,
        title: &str,
        value: &str,
        field: LoginField,
    ) {
        let focused = self.focus == field;
        let border = if focused {
            theme.focused_field
        } else {
            theme.input_border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(value).block(block), area);

        if focused && !self.submitting {
            let x = inner.x + (value.chars().count() as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }
}
