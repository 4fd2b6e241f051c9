//! Terminal UI rendering for the chat client.
//!
//! - `login`: credentials screen
//! - `chat`: message viewport, banner and compose line
//! - `theme`: colors and markup-to-terminal styles

pub mod chat;
pub mod login;
pub mod theme;
