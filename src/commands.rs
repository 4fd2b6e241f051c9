//! Client-side commands (/quit, /logout, /help).
//!
//! Any other line, including other slash commands, goes to the backend as a
//! normal message; the room decides what `/roll` or `/me` mean.

/// Commands handled without contacting the backend
pub const LOCAL_COMMANDS: [&str; 3] = ["/help", "/logout", "/quit"];

pub const HELP_TEXT: &str = "Commands: /quit exits, /logout returns to the login screen, /help shows this. \
Markup: [b]bold[/b] [i]italic[/i] [u]underline[/u] [quote]quote[/quote] [code]code[/code] [color=red]color[/color]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Quit,
    Logout,
    Help,
}

/// Recognise a local command. Returns None for anything that should be sent.
pub fn parse_local_command(input: &str) -> Option<LocalCommand> {
    let s = input.trim();
    let cmd = s.strip_prefix('/')?.split_whitespace().next()?.to_lowercase();

    match cmd.as_str() {
        "quit" | "exit" => Some(LocalCommand::Quit),
        "logout" => Some(LocalCommand::Logout),
        "help" => Some(LocalCommand::Help),
        _ => None,
    }
}
