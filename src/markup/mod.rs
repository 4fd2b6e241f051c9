//! Inline markup rendering for message content.
//!
//! Raw text such as `hi [b]there[/b], [color=navy]sailor[/color]` is split
//! into fragments, each optionally carrying a [`StyleKind`]. Rendering never
//! fails: anything that is not a well-formed tag is shown literally.

mod lexer;
mod style;

pub use lexer::{split_command, tokenize, CommandPrefix, Token};
pub use style::{
    parse_color_spec, AnsiStyler, ColorSpec, StyleApplier, StyleKind, CODE_PALETTE_INDEX,
    QUOTE_PALETTE_INDEX,
};

use crate::config::ColorTable;

/// Color name applied to a leading `/command`
const COMMAND_COLOR: &str = "red";

/// A run of visible text with its resolved style (`None` for literal text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub style: Option<StyleKind>,
}

impl<'a> Fragment<'a> {
    fn literal(text: &'a str) -> Self {
        Self { text, style: None }
    }
}

/// Markup renderer configured with a color table and a style capability.
#[derive(Debug, Clone)]
pub struct Renderer<S = AnsiStyler> {
    colors: ColorTable,
    styler: S,
}

impl Renderer<AnsiStyler> {
    pub fn new(colors: ColorTable) -> Self {
        Self::with_styler(colors, AnsiStyler)
    }
}

impl Default for Renderer<AnsiStyler> {
    fn default() -> Self {
        Self::new(ColorTable::default())
    }
}

impl<S: StyleApplier> Renderer<S> {
    pub fn with_styler(colors: ColorTable, styler: S) -> Self {
        Self { colors, styler }
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    /// Render raw markup to a styled string.
    pub fn render(&self, raw: &str) -> String {
        self.fragments(raw)
            .into_iter()
            .map(|fragment| match &fragment.style {
                Some(style) => self.styler.apply_style(fragment.text, style),
                None => fragment.text.to_string(),
            })
            .collect()
    }

    /// Resolve raw markup into styled fragments, in input order.
    pub fn fragments<'a>(&self, raw: &'a str) -> Vec<Fragment<'a>> {
        let mut fragments = Vec::new();

        let body = match split_command(raw) {
            Some(cmd) => {
                fragments.push(Fragment {
                    text: cmd.command,
                    style: Some(StyleKind::Color(
                        self.colors.resolve(COMMAND_COLOR).to_string(),
                    )),
                });
                fragments.push(Fragment::literal(cmd.separator));
                cmd.rest
            }
            None => raw,
        };

        for token in tokenize(body) {
            match token {
                Token::Text(text) => fragments.push(Fragment::literal(text)),
                Token::Tagged {
                    name, value, inner, ..
                } => {
                    if inner.is_empty() {
                        continue;
                    }
                    fragments.push(Fragment {
                        text: inner,
                        style: Some(self.resolve_tag(name, value)),
                    });
                }
            }
        }

        fragments
    }

    fn resolve_tag(&self, name: &str, value: Option<&str>) -> StyleKind {
        match name {
            "b" => StyleKind::Bold,
            "i" => StyleKind::Italic,
            "u" => StyleKind::Underline,
            "quote" => StyleKind::Quote,
            "code" => StyleKind::Code,
            "color" => StyleKind::Color(self.colors.resolve(value.unwrap_or_default()).to_string()),
            _ => StyleKind::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Marks styled spans with visible tags so output is easy to compare.
    struct MarkerStyler;

    impl StyleApplier for MarkerStyler {
        fn apply_style(&self, text: &str, style: &StyleKind) -> String {
            match style {
                StyleKind::Plain => text.to_string(),
                StyleKind::Color(spec) => format!("<color {}>{}</>", spec, text),
                other => format!("<{:?}>{}</>", other, text).to_lowercase(),
            }
        }
    }

    fn renderer() -> Renderer<MarkerStyler> {
        Renderer::with_styler(ColorTable::default(), MarkerStyler)
    }

    fn visible(renderer: &Renderer<MarkerStyler>, raw: &str) -> String {
        renderer.fragments(raw).iter().map(|f| f.text).collect()
    }

    #[test]
    fn test_basic_styles() {
        let r = renderer();
        assert_eq!(r.render("[b]x[/b]"), "<bold>x</>");
        assert_eq!(r.render("[i]x[/i]"), "<italic>x</>");
        assert_eq!(r.render("[u]x[/u]"), "<underline>x</>");
        assert_eq!(r.render("[quote]x[/quote]"), "<quote>x</>");
        assert_eq!(r.render("[code]x[/code]"), "<code>x</>");
        assert_eq!(r.render("say [b]hi[/b] now"), "say <bold>hi</> now");
    }

    #[test]
    fn test_named_color_resolves_through_table() {
        let r = renderer();
        assert_eq!(r.render("[color=navy]x[/color]"), "<color #000080>x</>");
    }

    #[test]
    fn test_unknown_color_passes_through() {
        let r = renderer();
        assert_eq!(r.render("[color=#123abc]x[/color]"), "<color #123abc>x</>");
        assert_eq!(r.render("[color=bogus]x[/color]"), "<color bogus>x</>");
        assert_eq!(r.render("[color]x[/color]"), "<color >x</>");
    }

    #[test]
    fn test_injected_color_table() {
        let mut colors = ColorTable::empty();
        colors.insert("navy", "4");
        let r = Renderer::with_styler(colors, MarkerStyler);
        assert_eq!(r.render("[color=navy]x[/color]"), "<color 4>x</>");
        // without a table entry the command color name is passed on as-is
        assert_eq!(r.render("/me waves"), "<color red>/me</> waves");
    }

    #[test]
    fn test_unknown_tag_is_stripped() {
        let r = renderer();
        assert_eq!(r.render("[spoiler]secret[/spoiler]"), "secret");
        assert_eq!(r.render("[]x[/]"), "x");
        assert_eq!(r.render("[b][/b]"), "");
    }

    #[test]
    fn test_malformed_tag_is_literal() {
        let r = renderer();
        assert_eq!(r.render("[b]unterminated"), "[b]unterminated");
        assert_eq!(r.render("a [ b ] c"), "a [ b ] c");
    }

    #[test]
    fn test_command_rewrite() {
        let r = renderer();
        assert_eq!(r.render("/roll 2d6 result"), "<color #ff0000>/roll</> 2d6 result");

        let fragments = r.fragments("/roll 2d6 result");
        assert_eq!(fragments[0].text, "/roll");
        assert_eq!(fragments[0].style, Some(StyleKind::Color("#ff0000".into())));
        assert_eq!(fragments[1], Fragment::literal(" "));
        assert!(fragments[2..].iter().all(|f| f.style.is_none()));
    }

    #[test]
    fn test_command_rewrite_then_markup() {
        let r = renderer();
        assert_eq!(
            r.render("/shout [b]loud[/b]"),
            "<color #ff0000>/shout</> <bold>loud</>"
        );
        // no separator, no rewrite
        assert_eq!(r.render("/roll"), "/roll");
        // only at the start of the text
        assert_eq!(r.render("try /roll now"), "try /roll now");
    }

    #[test]
    fn test_nested_tags() {
        let r = renderer();
        assert_eq!(r.render("[b][i]x[/i][/b]"), "[b]<italic>x</>[/b]");
        assert_eq!(r.render("[b]open [u]u[/u]"), "[b]open <underline>u</>");
    }

    #[test]
    fn test_adjacent_tags() {
        let r = renderer();
        assert_eq!(r.render("[b]a[/b][i]b[/i]"), "<bold>a</><italic>b</>");
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = renderer();
        let inputs = ["/roll [b]d20[/b]", "[color=lime]go[/color]", "[x", ""];
        for input in inputs {
            assert_eq!(r.render(input), r.render(input));
        }
        let ansi = Renderer::default();
        assert_eq!(ansi.render("[b]x[/b] y"), ansi.render("[b]x[/b] y"));
    }

    #[test]
    fn test_visible_text_is_preserved_in_order() {
        let r = renderer();
        let cases = [
            ("hello", "hello"),
            ("a [b]b[/b] c", "a b c"),
            ("[color=red]r[/color][u]u[/u]", "ru"),
            ("[b]unterminated [i]x[/i]", "[b]unterminated x"),
            ("/roll [code]1d4[/code]!", "/roll 1d4!"),
            ("многоязычный [b]текст[/b] 🎲", "многоязычный текст 🎲"),
        ];
        for (raw, expected) in cases {
            assert_eq!(visible(&r, raw), expected, "input: {:?}", raw);
        }
    }

    #[test]
    fn test_ansi_renderer_keeps_plain_text() {
        let r = Renderer::default();
        assert_eq!(r.render("nothing to style"), "nothing to style");
        assert_eq!(r.render("[b]unterminated"), "[b]unterminated");
        assert!(r.render("[b]x[/b]").contains("\x1b["));
    }
}
