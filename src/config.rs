// Tool configuration loaded from an optional TOML file
//
// Every field has a default, so a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Journal unit of the clock-synchronized host service
pub const DEFAULT_SYNC_SERVICE: &str = "diretta_sync_host";

/// Journal unit of the memory-playback host service
pub const DEFAULT_MEMORY_SERVICE: &str = "diretta_memoryplay_host";

/// Lines fetched when `--analyze-*` is given without a count
pub const DEFAULT_LOG_LINES: usize = 1000;

/// Configuration for log analysis
///
/// # Example
/// ```
/// use ddscalc::config::AnalyzerConfig;
///
/// let config = AnalyzerConfig::from_toml_str("default_log_lines = 500").unwrap();
/// assert_eq!(config.default_log_lines, 500);
/// assert_eq!(config.sync_service, "diretta_sync_host");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Service analyzed by `--analyze-sync`
    pub sync_service: String,

    /// Service analyzed by `--analyze-memory`
    pub memory_service: String,

    /// Settings files searched, in order, for a configured `CycleTime`
    pub settings_paths: Vec<PathBuf>,

    pub default_log_lines: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sync_service: DEFAULT_SYNC_SERVICE.to_string(),
            memory_service: DEFAULT_MEMORY_SERVICE.to_string(),
            settings_paths: default_settings_paths(),
            default_log_lines: DEFAULT_LOG_LINES,
        }
    }
}

/// `$HOME/DirettaAlsaHost/setting.inf`, then `/etc/diretta/setting.inf`
pub fn default_settings_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join("DirettaAlsaHost").join("setting.inf"));
    }
    paths.push(PathBuf::from("/etc/diretta/setting.inf"));
    paths
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sync_service.trim().is_empty() {
            return Err("sync_service must not be empty".to_string());
        }

        if self.memory_service.trim().is_empty() {
            return Err("memory_service must not be empty".to_string());
        }

        if self.default_log_lines == 0 {
            return Err("default_log_lines must be >= 1, got 0".to_string());
        }

        Ok(())
    }
}
