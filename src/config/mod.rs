//! Configuration management for muxdeck.
//!
//! Settings live in `<config_dir>/muxdeck/config.toml`. Every section and
//! field is optional; missing values take their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::capture::{CaptureSettings, DEFAULT_CAPTURE_INTERVAL, DEFAULT_SCROLLBACK_LINES};
use crate::tmux::{TmuxSettings, DEFAULT_COMMAND_TIMEOUT};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub tmux: TmuxConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Config {
    /// Load configuration from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate();

        Ok(config)
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;

        Ok(config_dir.join("muxdeck").join("config.toml"))
    }

    /// Clamp every value into its usable range.
    pub fn validate(&mut self) {
        self.layout.validate();
        self.tmux.timeout_ms = self.tmux.timeout_ms.max(100);
        self.capture.interval_ms = self.capture.interval_ms.max(10);
        self.capture.scrollback_lines = self.capture.scrollback_lines.max(1);
        self.refresh.interval_secs = self.refresh.interval_secs.max(1);
    }

    pub fn tmux_settings(&self) -> TmuxSettings {
        TmuxSettings {
            command: self.tmux.command.clone(),
            socket: self.tmux.socket.clone(),
            timeout: Duration::from_millis(self.tmux.timeout_ms),
        }
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            interval: Duration::from_millis(self.capture.interval_ms),
            scrollback_lines: self.capture.scrollback_lines,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Sidebar width as percentage (10-50%)
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_pct: u8,
}

fn default_sidebar_width() -> u8 {
    20
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sidebar_width_pct: default_sidebar_width(),
        }
    }
}

impl LayoutConfig {
    /// Validate and clamp sidebar width to valid range (10-50%)
    pub fn validate(&mut self) {
        self.sidebar_width_pct = self.sidebar_width_pct.clamp(10, 50);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// tmux binary
    pub command: String,
    /// `-L` socket name; the default server when unset
    pub socket: Option<String>,
    /// Per-command timeout
    pub timeout_ms: u64,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            command: "tmux".to_string(),
            socket: None,
            timeout_ms: DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub interval_ms: u64,
    pub scrollback_lines: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_CAPTURE_INTERVAL.as_millis() as u64,
            scrollback_lines: DEFAULT_SCROLLBACK_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between session list refreshes
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}
