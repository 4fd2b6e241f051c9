//! Application module structure for ChatApp
//!
//! - `core`: ChatApp struct, screens and initialization
//! - `events`: Event processing from backend
//! - `update`: Key handling, drawing and the terminal loop

pub mod core;
pub mod events;
pub mod update;

pub use self::core::{ChatApp, Screen};
