use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Default configuration
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of input lines remembered between sessions
const MAX_HISTORY: usize = 100;

const NAMED_COLORS: [(&str, &str); 17] = [
    ("gray", "#808080"),
    ("silver", "#c0c0c0"),
    ("white", "#ffffff"),
    ("yellow", "#f8f801"),
    ("orange", "#ffa500"),
    ("red", "#ff0000"),
    ("fuchsia", "#ff00ff"),
    ("purple", "#800080"),
    ("navy", "#000080"),
    ("blue", "#0000ff"),
    ("aqua", "#00ffff"),
    ("teal", "#008080"),
    ("green", "#008000"),
    ("lime", "#00ff00"),
    ("olive", "#808000"),
    ("maroon", "#800000"),
    ("black", "#000000"),
];

/// Named colors accepted by `[color=name]` markup, mapped to color specifiers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct ColorTable(BTreeMap<String, String>);

impl ColorTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Resolve a color name. Unknown names come back unchanged so that raw
    /// specifiers (`#123abc`, `5`) pass straight through.
    pub fn resolve<'a>(&'a self, value: &'a str) -> &'a str {
        self.0.get(value).map(String::as_str).unwrap_or(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self(
            NAMED_COLORS
                .iter()
                .map(|(name, hex)| (name.to_string(), hex.to_string()))
                .collect(),
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub username: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Use the in-process room instead of a remote server
    pub offline: bool,
    pub history: Vec<String>,
    pub colors: ColorTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            username: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            offline: false,
            history: Vec::new(),
            colors: ColorTable::default(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Replace the stored history, keeping only the most recent entries.
    pub fn set_history(&mut self, history: &[String]) {
        let skip = history.len().saturating_sub(MAX_HISTORY);
        self.history = history[skip..].to_vec();
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "akichat", "akichat-tui") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

pub fn load_settings() -> Option<Settings> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_settings(settings: &Settings) -> std::io::Result<()> {
    if let Some(path) = settings_path() {
        save_settings_to(&path, settings)?;
    }
    Ok(())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> std::io::Result<()> {
    let data = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color_table() {
        let colors = ColorTable::default();
        assert_eq!(colors.len(), 17);
        assert_eq!(colors.resolve("navy"), "#000080");
        assert_eq!(colors.resolve("yellow"), "#f8f801");
        assert_eq!(colors.resolve("#123abc"), "#123abc");
        assert_eq!(colors.resolve("chartreuse"), "chartreuse");
    }

    #[test]
    fn test_custom_color_table() {
        let mut colors = ColorTable::empty();
        assert!(colors.is_empty());
        colors.insert("navy", "4");
        assert_eq!(colors.resolve("navy"), "4");
        assert_eq!(colors.resolve("red"), "red");
    }

    #[test]
    fn test_settings_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.username = "alice".into();
        settings.colors.insert("brand", "#5f00af");
        save_settings_to(&path, &settings).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.colors.resolve("brand"), "#5f00af");
        assert_eq!(loaded.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"username":"bob","poll_interval_secs":0}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.username, "bob");
        assert_eq!(loaded.server_url, DEFAULT_SERVER_URL);
        // zero is clamped so the poller never spins
        assert_eq!(loaded.poll_interval(), Duration::from_secs(1));
        assert_eq!(loaded.colors, ColorTable::default());
    }

    #[test]
    fn test_unreadable_settings_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_settings_from(&path).is_none());
    }

    #[test]
    fn test_history_is_capped() {
        let mut settings = Settings::default();
        let history: Vec<String> = (0..150).map(|i| format!("line {}", i)).collect();
        settings.set_history(&history);
        assert_eq!(settings.history.len(), MAX_HISTORY);
        assert_eq!(settings.history[0], "line 50");
    }
}
