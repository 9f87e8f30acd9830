//! Configuration for kilo.
//!
//! Settings are read from `~/.kilo/config.toml`. The file is optional and
//! every field has a default, so a partial file only overrides what it
//! names:
//!
//! ```toml
//! # Log filter for ~/.kilo/kilo.log (tracing EnvFilter syntax)
//! log_level = "info"
//!
//! [input]
//! # Read timeout in tenths of a second (1-255)
//! read_timeout = 1
//!
//! [display]
//! empty_row_glyph = "~"
//! show_welcome = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive
    pub log_level: String,
    pub input: InputConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            input: InputConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Keyboard input settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// VTIME, in tenths of a second
    pub read_timeout: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { read_timeout: 1 }
    }
}

impl InputConfig {
    /// Read timeout actually applied; zero would make reads block forever
    pub fn effective_read_timeout(&self) -> u8 {
        self.read_timeout.max(1)
    }
}

/// Screen drawing settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Drawn in the first column of rows with no content
    pub empty_row_glyph: char,
    /// Show the version banner in the middle of the screen
    pub show_welcome: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            empty_row_glyph: '~',
            show_welcome: true,
        }
    }
}

impl Config {
    /// Load configuration from `~/.kilo/config.toml`, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn config_path() -> Option<PathBuf> {
        kilo_dir().map(|dir| dir.join("config.toml"))
    }
}

/// `~/.kilo`, where the config and log files live
pub fn kilo_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".kilo"))
}
