//! akichat-tui library.
//!
//! This module re-exports the core components for testing and extension.

pub mod app;
pub mod backend;
pub mod commands;
pub mod config;
pub mod input_state;
pub mod logging;
pub mod markup;
pub mod protocol;
pub mod sync;
pub mod terminal;
pub mod ui;
pub mod validation;

#[cfg(test)]
mod backend_tests;
