//! Diagnostic logging
//!
//! The terminal belongs to the UI, so diagnostics go to a daily-rotated
//! file in XDG_DATA_HOME/akichat-tui/logs/ through a background writer
//! thread. `RUST_LOG` selects the level (default `info`).

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "akichat.log";

/// Install the global subscriber writing under `log_dir`. Keep the returned
/// guard alive for the whole program; dropping it flushes pending lines.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, String> {
    fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    Ok(guard)
}

/// Get the platform-specific log directory using XDG conventions
pub fn log_directory() -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new().ok_or("Failed to determine home directory")?;

    // Use XDG_DATA_HOME on Linux, equivalent on other platforms
    let data_dir = base.data_dir();
    Ok(data_dir.join("akichat-tui").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_is_namespaced() {
        if let Ok(path) = log_directory() {
            assert!(path.ends_with("akichat-tui/logs"));
        }
    }
}
