//! Single-pass lexer for inline markup tags.
//!
//! A tag span is `[name]inner[/close]` or `[name=value]inner[/close]`. The
//! inner text contains no `[`: the first bracket after the header must open
//! the close tag, whose name is not checked against the opening one. Nothing
//! in a tag may cross a line break. A `[` that does not start a complete span
//! is literal, and scanning resumes right after it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading `/command` followed by its whitespace separator.
static COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/\S+)(\s)").expect("command regex pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal run of characters
    Text(&'a str),
    /// Complete tag span
    Tagged {
        raw: &'a str,
        name: &'a str,
        value: Option<&'a str>,
        inner: &'a str,
    },
}

impl<'a> Token<'a> {
    /// The exact slice of input this token covers.
    pub fn raw(&self) -> &'a str {
        match self {
            Token::Text(text) => text,
            Token::Tagged { raw, .. } => raw,
        }
    }
}

/// Leading slash command of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPrefix<'a> {
    pub command: &'a str,
    pub separator: &'a str,
    pub rest: &'a str,
}

/// Split off a leading `/command` when it is followed by whitespace.
pub fn split_command(input: &str) -> Option<CommandPrefix<'_>> {
    let caps = COMMAND_RE.captures(input)?;
    let command = caps.get(1)?;
    let separator = caps.get(2)?;
    Some(CommandPrefix {
        command: command.as_str(),
        separator: separator.as_str(),
        rest: &input[separator.end()..],
    })
}

/// Tokenize `input`. Every byte is covered by exactly one token, in order.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some((token, end)) = scan_tag(input, i) {
                if literal_start < i {
                    tokens.push(Token::Text(&input[literal_start..i]));
                }
                tokens.push(token);
                i = end;
                literal_start = end;
                continue;
            }
        }
        // '[' is ASCII, so stepping bytewise never lands a later slice
        // inside a multi-byte character.
        i += 1;
    }

    if literal_start < bytes.len() {
        tokens.push(Token::Text(&input[literal_start..]));
    }

    tokens
}

/// Index of the first byte at or after `from` that is one of `stops`.
fn find_stop(bytes: &[u8], from: usize, stops: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| stops.contains(b))
        .map(|pos| from + pos)
}

/// Try to read a complete tag span starting at the `[` at `start`.
/// Returns the token and the byte offset just past it.
///
/// Every scan stops at the next `[`, so a failed attempt never looks past
/// the second bracket after `start` and tokenizing stays linear.
fn scan_tag(input: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let bytes = input.as_bytes();

    let header_start = start + 1;
    let header_end = find_stop(bytes, header_start, b"[]\n")?;
    if bytes[header_end] != b']' {
        return None;
    }
    let header = &input[header_start..header_end];
    let (name, value) = match header.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (header, None),
    };

    // Inner text runs to the next bracket, which has to open the close tag
    let body_start = header_end + 1;
    let close_start = find_stop(bytes, body_start, b"[\n")?;
    if bytes[close_start] != b'[' || bytes.get(close_start + 1) != Some(&b'/') {
        return None;
    }
    let inner = &input[body_start..close_start];

    let close_end = find_stop(bytes, close_start + 2, b"[]\n")?;
    if bytes[close_end] != b']' {
        return None;
    }

    let end = close_end + 1;
    Some((
        Token::Tagged {
            raw: &input[start..end],
            name,
            value,
            inner,
        },
        end,
    ))
}
