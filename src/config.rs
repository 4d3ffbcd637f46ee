//! Client configuration.
//!
//! Configuration is resolved in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `EVENTBUDDY_*` environment variables

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

/// Default backend API base URL (local development server).
const DEFAULT_API_URL: &str = "http://127.0.0.1:4000/api";

/// Default session poll interval in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default HTTP request timeout in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API base URL, without a trailing slash.
    pub api_url: String,
    /// Directory holding the persisted session files.
    pub state_dir: PathBuf,
    /// How often the session poller re-reads persisted state.
    pub poll_interval_secs: u64,
    /// Per-request HTTP timeout.
    pub http_timeout_secs: u64,
}

/// On-disk configuration file shape. All fields optional; missing
/// fields fall back to defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    state_dir: Option<PathBuf>,
    poll_interval_secs: Option<u64>,
    http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: default_state_dir(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file_path() {
            if path.exists() {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let file: ConfigFile = toml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?;
                config.apply(file);
            }
        }

        config.apply_env();
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(dir) = file.state_dir {
            self.state_dir = dir;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval_secs = secs;
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http_timeout_secs = secs;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("EVENTBUDDY_API_URL") {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(dir) = std::env::var("EVENTBUDDY_STATE_DIR") {
            if !dir.is_empty() {
                self.state_dir = PathBuf::from(dir);
            }
        }
        if let Ok(secs) = std::env::var("EVENTBUDDY_POLL_INTERVAL_SECS") {
            if let Ok(parsed) = secs.parse() {
                self.poll_interval_secs = parsed;
            }
        }
    }
}

/// Platform config file location (`~/.config/eventbuddy/config.toml` on Linux).
fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "eventbuddy").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Platform data directory for session state, with a relative fallback
/// for environments without a home directory.
fn default_state_dir() -> PathBuf {
    ProjectDirs::from("", "", "eventbuddy")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".eventbuddy"))
}
