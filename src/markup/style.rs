//! Style kinds produced by markup and the capability that applies them.

use crossterm::style::{Attribute, Color, ContentStyle};

/// Palette index used for `[quote]` spans
pub const QUOTE_PALETTE_INDEX: u8 = 5;
/// Palette index used for `[code]` spans
pub const CODE_PALETTE_INDEX: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
    Quote,
    Code,
    /// Resolved color specifier (hex or palette index, or anything the
    /// sender wrote)
    Color(String),
    /// Tag stripped, no styling
    Plain,
}

/// A parsed color specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Rgb(u8, u8, u8),
    Indexed(u8),
}

/// Parse `#rrggbb`, `#rgb` or a `0..=255` palette index.
pub fn parse_color_spec(spec: &str) -> Option<ColorSpec> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            6 => Some(ColorSpec::Rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
                Some(ColorSpec::Rgb(channel(0).ok()?, channel(1).ok()?, channel(2).ok()?))
            }
            _ => None,
        };
    }
    spec.parse::<u8>().ok().map(ColorSpec::Indexed)
}

impl From<ColorSpec> for Color {
    fn from(spec: ColorSpec) -> Self {
        match spec {
            ColorSpec::Rgb(r, g, b) => Color::Rgb { r, g, b },
            ColorSpec::Indexed(i) => Color::AnsiValue(i),
        }
    }
}

/// Turns a text run plus a style into displayable text.
pub trait StyleApplier {
    fn apply_style(&self, text: &str, style: &StyleKind) -> String;
}

/// ANSI escape-code styling for plain terminal output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiStyler;

impl StyleApplier for AnsiStyler {
    fn apply_style(&self, text: &str, style: &StyleKind) -> String {
        let mut content = ContentStyle::new();
        match style {
            StyleKind::Bold => content.attributes.set(Attribute::Bold),
            StyleKind::Italic => content.attributes.set(Attribute::Italic),
            StyleKind::Underline => content.attributes.set(Attribute::Underlined),
            StyleKind::Quote => content.foreground_color = Some(Color::AnsiValue(QUOTE_PALETTE_INDEX)),
            StyleKind::Code => content.foreground_color = Some(Color::AnsiValue(CODE_PALETTE_INDEX)),
            StyleKind::Color(spec) => match parse_color_spec(spec) {
                Some(color) => content.foreground_color = Some(color.into()),
                // Not a color we can draw: show the text as-is.
                None => return text.to_string(),
            },
            StyleKind::Plain => return text.to_string(),
        }
        content.apply(text).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_spec() {
        assert_eq!(parse_color_spec("#000080"), Some(ColorSpec::Rgb(0, 0, 128)));
        assert_eq!(parse_color_spec("#123ABC"), Some(ColorSpec::Rgb(0x12, 0x3a, 0xbc)));
        assert_eq!(parse_color_spec("#fff"), Some(ColorSpec::Rgb(255, 255, 255)));
        assert_eq!(parse_color_spec("5"), Some(ColorSpec::Indexed(5)));
        assert_eq!(parse_color_spec("255"), Some(ColorSpec::Indexed(255)));

        assert_eq!(parse_color_spec("256"), None);
        assert_eq!(parse_color_spec("#12345"), None);
        assert_eq!(parse_color_spec("#gggggg"), None);
        assert_eq!(parse_color_spec("chartreuse"), None);
        assert_eq!(parse_color_spec(""), None);
    }

    #[test]
    fn test_ansi_bold_wraps_text() {
        let out = AnsiStyler.apply_style("x", &StyleKind::Bold);
        assert!(out.starts_with("\x1b[1m"));
        assert!(out.contains('x'));
        assert_ne!(out, "x");
    }

    #[test]
    fn test_ansi_plain_and_unknown_color_are_untouched() {
        assert_eq!(AnsiStyler.apply_style("x", &StyleKind::Plain), "x");
        assert_eq!(
            AnsiStyler.apply_style("x", &StyleKind::Color("chartreuse".into())),
            "x"
        );
    }
}
