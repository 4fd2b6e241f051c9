//! Chat screen: message viewport, banner and compose line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::theme::{nick_color, style_for, ChatTheme};
use crate::input_state::InputState;
use crate::markup::Renderer;
use crate::protocol::{Message, MessageKind};
use crate::sync::{MergeOutcome, SyncState};

pub const EMPTY_VIEWPORT_TEXT: &str = "Type a message and press Enter to send.";
pub const INPUT_PLACEHOLDER: &str = "Send a message...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// Poll failures; cleared by the next successful poll
    Connection(String),
    Error(String),
    Info(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Connection(s) | Banner::Error(s) | Banner::Info(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    None,
    Submit(String),
    Quit,
}

pub struct ChatView {
    username: String,
    sync: SyncState,
    pub input: InputState,
    renderer: Renderer,
    banner: Option<Banner>,
    /// Rows scrolled back from the bottom; 0 follows new messages
    scroll_back: usize,
    /// Viewport height from the last draw, used for page scrolling
    page_height: usize,
    /// Sends reported neither success nor failure yet
    pending_sends: usize,
    theme: ChatTheme,
    /// Styled viewport lines, extended as batches arrive
    lines: Vec<Line<'static>>,
    /// Wrapped row count of each entry in `lines` at `wrap_width`
    line_rows: Vec<usize>,
    wrap_width: u16,
}

impl ChatView {
    pub fn new(
        username: impl Into<String>,
        renderer: Renderer,
        theme: ChatTheme,
        history: Vec<String>,
    ) -> Self {
        Self {
            username: username.into(),
            sync: SyncState::new(),
            input: InputState::with_history(history),
            renderer,
            banner: None,
            scroll_back: 0,
            page_height: 10,
            pending_sends: 0,
            theme,
            lines: Vec::new(),
            line_rows: Vec::new(),
            wrap_width: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn sync(&self) -> &SyncState {
        &self.sync
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn pending_sends(&self) -> usize {
        self.pending_sends
    }

    /// Merge one polled batch. Jumps to the bottom when the log grew.
    pub fn apply_batch(&mut self, batch: Vec<Message>) -> MergeOutcome {
        let outcome = self.sync.merge(batch);
        if outcome.appended > 0 {
            self.render_new_messages(outcome.appended);
        }
        if outcome.scroll {
            self.scroll_back = 0;
        }
        if matches!(self.banner, Some(Banner::Connection(_))) {
            self.banner = None;
        }
        outcome
    }

    pub fn connection_problem(&mut self, reason: impl Into<String>) {
        self.banner = Some(Banner::Connection(reason.into()));
    }

    pub fn show_error(&mut self, reason: impl Into<String>) {
        self.banner = Some(Banner::Error(reason.into()));
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner::Info(text.into()));
    }

    pub fn begin_send(&mut self) {
        self.pending_sends += 1;
    }

    /// A send resolved. The message itself only shows up through a later
    /// poll, never from here.
    pub fn finish_send(&mut self, result: Result<(), String>) {
        self.pending_sends = self.pending_sends.saturating_sub(1);
        if let Err(e) = result {
            self.show_error(format!("Message not sent: {}", e));
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(rows);
    }

    /// Distinct authors of user messages, for name completion.
    pub fn authors(&self) -> Vec<&str> {
        let mut authors: Vec<&str> = self
            .sync
            .messages()
            .iter()
            .filter(|m| m.kind == MessageKind::User)
            .map(|m| m.author.as_str())
            .collect();
        authors.sort_unstable();
        authors.dedup();
        authors
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ChatAction::Quit,
            KeyCode::Char('c') if ctrl => return ChatAction::Quit,
            KeyCode::Enter => {
                if let Some(text) = self.input.take_submission() {
                    return ChatAction::Submit(text);
                }
            }
            KeyCode::Up if ctrl => self.scroll_up(1),
            KeyCode::Down if ctrl => self.scroll_down(1),
            KeyCode::Up => self.input.history_up(),
            KeyCode::Down => self.input.history_down(),
            KeyCode::PageUp => self.scroll_up(self.page_height.max(1)),
            KeyCode::PageDown => self.scroll_down(self.page_height.max(1)),
            KeyCode::End if ctrl => self.scroll_back = 0,
            KeyCode::Tab => {
                let authors: Vec<String> =
                    self.authors().into_iter().map(str::to_string).collect();
                let refs: Vec<&str> = authors.iter().map(String::as_str).collect();
                self.input.complete(&refs);
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Char(c) if !ctrl => self.input.insert_char(c),
            _ => {}
        }
        ChatAction::None
    }

    /// Styled lines of every merged message, one blank line between
    /// messages. Empty until the first message arrives.
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Style the last `count` messages of the log onto the end of `lines`.
    fn render_new_messages(&mut self, count: usize) {
        let mut lines = std::mem::take(&mut self.lines);
        let messages = self.sync.messages();
        for message in &messages[messages.len().saturating_sub(count)..] {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            self.push_message_lines(message, &mut lines);
        }
        self.lines = lines;
    }

    fn push_message_lines(&self, message: &Message, lines: &mut Vec<Line<'static>>) {
        let theme = &self.theme;
        let system = message.kind == MessageKind::System;

        let header = format!("[{}]: {}", message.author, message.time);
        if system {
            lines.push(Line::styled(header, theme.system).alignment(Alignment::Center));
        } else {
            lines.push(Line::from(vec![
                Span::styled("[", theme.header),
                Span::styled(
                    message.author.clone(),
                    theme.author.fg(nick_color(&message.author)),
                ),
                Span::styled("]: ", theme.header),
                Span::styled(message.time.clone(), theme.time),
            ]));
        }

        let base = if system {
            theme.system
        } else {
            ratatui::style::Style::default()
        };
        let mut current: Vec<Span<'static>> = Vec::new();
        for fragment in self.renderer.fragments(&message.content) {
            let style = match &fragment.style {
                Some(kind) => base.patch(style_for(kind)),
                None => base,
            };
            let mut pieces = fragment.text.split('\n');
            if let Some(first) = pieces.next() {
                if !first.is_empty() {
                    current.push(Span::styled(first.to_string(), style));
                }
            }
            for piece in pieces {
                lines.push(content_line(std::mem::take(&mut current), system));
                if !piece.is_empty() {
                    current.push(Span::styled(piece.to_string(), style));
                }
            }
        }
        lines.push(content_line(current, system));
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let [viewport_area, banner_area, input_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(frame.area());

        self.draw_viewport(frame, viewport_area);
        self.draw_banner(frame, banner_area);
        self.draw_input(frame, input_area);
    }

    /// Bring the wrapped row counts up to date with `lines` at `width`.
    /// Only lines added since the last draw are measured unless the width
    /// changed.
    fn measure_rows(&mut self, width: u16) {
        if width != self.wrap_width {
            self.line_rows.clear();
            self.wrap_width = width;
        }
        for line in &self.lines[self.line_rows.len()..] {
            let rows = Paragraph::new(line.clone())
                .wrap(Wrap { trim: false })
                .line_count(width);
            self.line_rows.push(rows);
        }
    }

    fn draw_viewport(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" {} ", self.username);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.viewport_border)
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        self.page_height = height;
        if self.lines.is_empty() {
            let hint = Line::from(Span::styled(EMPTY_VIEWPORT_TEXT, self.theme.placeholder));
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        }

        self.measure_rows(inner.width);
        let total: usize = self.line_rows.iter().sum();
        let max_back = total.saturating_sub(height);
        self.scroll_back = self.scroll_back.min(max_back);
        let top = max_back - self.scroll_back;

        // Find the line holding row `top`; `skip` rows of it sit above the viewport
        let mut first = 0;
        let mut row = 0;
        while first < self.line_rows.len() && row + self.line_rows[first] <= top {
            row += self.line_rows[first];
            first += 1;
        }
        let skip = top - row;

        let mut visible = Vec::new();
        let mut rows = 0;
        for (line, line_rows) in self.lines[first..].iter().zip(&self.line_rows[first..]) {
            if rows >= skip + height {
                break;
            }
            visible.push(line.clone());
            rows += line_rows;
        }

        let skip = u16::try_from(skip).unwrap_or(u16::MAX);
        let paragraph = Paragraph::new(visible)
            .wrap(Wrap { trim: false })
            .scroll((skip, 0));
        frame.render_widget(paragraph, inner);
    }

    fn draw_banner(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let line = match &self.banner {
            Some(Banner::Info(text)) => Line::from(Span::styled(text.clone(), theme.info)),
            Some(banner) => Line::from(Span::styled(banner.text().to_string(), theme.error)),
            None if self.scroll_back > 0 => Line::from(Span::styled(
                "-- scrolled back, Ctrl+End to follow --",
                theme.placeholder,
            )),
            None => Line::default(),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border);
        if self.pending_sends > 0 {
            block = block.title(" sending... ");
        }
        let inner = block.inner(area);

        let text = &self.input.message_input;
        let line = if text.is_empty() {
            Line::from(Span::styled(INPUT_PLACEHOLDER, theme.placeholder))
        } else {
            Line::from(text.as_str())
        };
        let width = if text.is_empty() { 0 } else { line.width() };

        // Keep the end of a long line visible
        let shift = width.saturating_sub(inner.width.saturating_sub(1) as usize);
        let shift = u16::try_from(shift).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(line).block(block).scroll((0, shift)), area);

        let cursor_x = inner.x + u16::try_from(width).unwrap_or(u16::MAX).saturating_sub(shift);
        frame.set_cursor_position(Position::new(cursor_x, inner.y));
    }
}

fn content_line(spans: Vec<Span<'static>>, centered: bool) -> Line<'static> {
    let line = Line::from(spans);
    if centered {
        line.alignment(Alignment::Center)
    } else {
        line
    }
}
