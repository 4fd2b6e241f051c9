//! Colors and styles for the terminal UI.
//!
//! Markup styles map onto ratatui styles here; the ANSI string renderer in
//! `markup` uses the same palette indices so both outputs agree.

use ratatui::style::{Color, Modifier, Style};

use crate::markup::{
    parse_color_spec, ColorSpec, StyleKind, CODE_PALETTE_INDEX, QUOTE_PALETTE_INDEX,
};

/// Author colors, picked per name by hash so a person keeps their color.
const NICK_COLORS: [Color; 8] = [
    Color::Indexed(1),
    Color::Indexed(2),
    Color::Indexed(3),
    Color::Indexed(4),
    Color::Indexed(5),
    Color::Indexed(6),
    Color::Indexed(9),
    Color::Indexed(12),
];

#[derive(Clone, Debug)]
pub struct ChatTheme {
    /// Header line of a user message
    pub header: Style,
    pub author: Style,
    pub time: Style,
    /// Header and body of a system message
    pub system: Style,
    pub viewport_border: Style,
    pub input_border: Style,
    pub placeholder: Style,
    pub error: Style,
    pub info: Style,
    pub focused_field: Style,
}

impl Default for ChatTheme {
    fn default() -> Self {
        let header_bg = Color::Rgb(0xef, 0xef, 0xef);
        Self {
            header: Style::default().fg(Color::Indexed(5)).bg(header_bg),
            author: Style::default().add_modifier(Modifier::BOLD).bg(header_bg),
            time: Style::default().bg(header_bg),
            system: Style::default().fg(Color::Indexed(2)),
            viewport_border: Style::default().fg(Color::Rgb(0xde, 0xde, 0xde)),
            input_border: Style::default().fg(Color::Rgb(0xde, 0xde, 0xde)),
            placeholder: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            info: Style::default().fg(Color::Indexed(2)),
            focused_field: Style::default().fg(Color::Indexed(5)),
        }
    }
}

impl From<ColorSpec> for Color {
    fn from(spec: ColorSpec) -> Self {
        match spec {
            ColorSpec::Rgb(r, g, b) => Color::Rgb(r, g, b),
            ColorSpec::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Terminal style for a markup span. Color specifiers that cannot be
/// parsed leave the text unstyled.
pub fn style_for(kind: &StyleKind) -> Style {
    match kind {
        StyleKind::Bold => Style::default().add_modifier(Modifier::BOLD),
        StyleKind::Italic => Style::default().add_modifier(Modifier::ITALIC),
        StyleKind::Underline => Style::default().add_modifier(Modifier::UNDERLINED),
        StyleKind::Quote => Style::default().fg(Color::Indexed(QUOTE_PALETTE_INDEX)),
        StyleKind::Code => Style::default().fg(Color::Indexed(CODE_PALETTE_INDEX)),
        StyleKind::Color(spec) => match parse_color_spec(spec) {
            Some(color) => Style::default().fg(color.into()),
            None => Style::default(),
        },
        StyleKind::Plain => Style::default(),
    }
}

/// Stable color for an author name (FNV-1a).
pub fn nick_color(nick: &str) -> Color {
    let mut hash: u64 = 1469598103934665603u64;
    for b in nick.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211u64);
    }
    let idx = (hash as usize) % NICK_COLORS.len();
    NICK_COLORS[idx]
}
