//! akichat-tui - a terminal chat client
//!
//! Architecture:
//! - Main thread: runs the ratatui UI and owns the message log
//! - Backend thread: runs a Tokio runtime for polling and sends
//! - Communication via crossbeam channels

use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, unbounded};

use akichat_tui::app::ChatApp;
use akichat_tui::backend::{run_backend, ChatBackend, HttpBackend, MemoryBackend, SyncOptions};
use akichat_tui::config::{load_settings, save_settings, Settings};
use akichat_tui::protocol::{BackendAction, GuiEvent};
use akichat_tui::{logging, terminal};

/// Capacity of the backend -> UI event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Terminal chat client with inline markup
#[derive(Parser, Debug)]
#[command(name = "akichat-tui", version)]
struct Cli {
    /// Chat server API base URL
    #[arg(long)]
    server: Option<String>,

    /// Use a local in-memory room instead of a server
    #[arg(long)]
    offline: bool,

    /// Seconds between polls
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Username to prefill on the login screen
    #[arg(long)]
    user: Option<String>,
}

impl Cli {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(server) = &self.server {
            settings.server_url = server.clone();
        }
        if self.offline {
            settings.offline = true;
        }
        if let Some(secs) = self.poll_interval {
            settings.poll_interval_secs = secs;
        }
        if let Some(user) = &self.user {
            settings.username = user.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings().unwrap_or_default();
    cli.apply_to(&mut settings);

    let log_dir = logging::log_directory().map_err(|e| anyhow!(e))?;
    let _log_guard = logging::init(&log_dir).map_err(|e| anyhow!(e))?;
    tracing::info!(server = %settings.server_url, offline = settings.offline, "starting");

    let backend: Arc<dyn ChatBackend> = if settings.offline {
        Arc::new(MemoryBackend::with_welcome())
    } else {
        Arc::new(
            HttpBackend::new(&settings.server_url, settings.request_timeout())
                .with_context(|| format!("Invalid server URL {}", settings.server_url))?,
        )
    };
    let authenticated = backend.is_authenticated();

    // Channels for UI <-> Backend
    let (action_tx, action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = bounded::<GuiEvent>(EVENT_CHANNEL_CAPACITY);

    let options = SyncOptions::from(&settings);
    let backend_thread = thread::Builder::new()
        .name("backend".into())
        .spawn(move || run_backend(action_rx, event_tx, backend, options))
        .context("Failed to spawn backend thread")?;

    let mut app = ChatApp::new(action_tx, event_rx, settings, authenticated);

    terminal::install_panic_hook();
    let mut tui = terminal::setup_terminal()?;
    let run_result = app.run(&mut tui);
    let restore_result = terminal::restore_terminal();

    // Stop the backend and persist settings even if the terminal could not
    // be restored
    let settings = app.shutdown();
    if backend_thread.join().is_err() {
        tracing::error!("backend thread panicked");
    }
    if let Err(e) = save_settings(&settings) {
        tracing::warn!(error = %e, "failed to save settings");
    }

    restore_result?;
    run_result
}
