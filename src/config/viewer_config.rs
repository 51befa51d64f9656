//! Viewer configuration parsing
//!
//! All sections are optional in YAML; anything omitted takes the default.
//! Environment variables win over the file:
//!
//! - `ETHERPAD_BASE_URL`, `ETHERPAD_API_KEY`
//! - `PAD_VIEWER_ADDR`
//! - `PAD_VIEWER_CONTENT_ROOT`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::shell::ShellOptions;

/// Root configuration structure for the viewer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub server: ServerConfig,
    pub refresh: RefreshConfig,
    pub etherpad: EtherpadConfig,
    pub content: ContentConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Stylesheet handed to the paginator for `format=doc`
    pub print_stylesheet: String,
    /// Script exposing `Paged.Previewer`
    pub paginator_script: Option<String>,
    /// How often a page checks for a newer render
    pub poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            print_stylesheet: "/pdf.css".to_string(),
            paginator_script: Some("https://unpkg.com/pagedjs/dist/paged.js".to_string()),
            poll_ms: 2_000,
        }
    }
}

impl ServerConfig {
    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            print_stylesheet: self.print_stylesheet.clone(),
            paginator_script: self.paginator_script.clone(),
            poll_ms: self.poll_ms,
        }
    }
}

/// Polling cadence per source type (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub file_interval_ms: u64,
    pub pad_interval_ms: u64,
    pub idle_interval_ms: u64,
    /// Views nobody has requested or polled for this long are unmounted.
    /// Must exceed the page poll interval.
    pub view_idle_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            file_interval_ms: 50_000,
            pad_interval_ms: 5_000,
            idle_interval_ms: 500,
            view_idle_ms: 300_000,
        }
    }
}

impl RefreshConfig {
    pub fn file_interval(&self) -> Duration {
        Duration::from_millis(self.file_interval_ms)
    }

    pub fn pad_interval(&self) -> Duration {
        Duration::from_millis(self.pad_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn view_idle(&self) -> Duration {
        Duration::from_millis(self.view_idle_ms)
    }

    /// How often mounted views are checked for idleness
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis((self.view_idle_ms / 4).max(1))
    }
}

/// Etherpad HTTP API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtherpadConfig {
    /// Base of the v1 API, e.g. `http://localhost:9001/api/1`
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for EtherpadConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9001/api/1".to_string(),
            api_key: String::new(),
            timeout_ms: 1_000,
        }
    }
}

impl EtherpadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where the refresh loop reads content from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Read the filesystem and Etherpad directly
    #[default]
    Backend,
    /// Go through the `/api/files` and `/api/etherpad` endpoints of another viewer
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub mode: ContentMode,
    /// Root directory for `source=file` locations
    pub root: PathBuf,
    /// Base URL used when `mode` is `http`
    pub api_base_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            mode: ContentMode::Backend,
            root: PathBuf::from("content"),
            api_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse viewer config")
    }

    /// Load from `path` if it exists, otherwise start from defaults, then
    /// apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ETHERPAD_BASE_URL") {
            self.etherpad.base_url = url;
        }
        if let Some(key) = lookup("ETHERPAD_API_KEY") {
            self.etherpad.api_key = key;
        }
        if let Some(addr) = lookup("PAD_VIEWER_ADDR") {
            self.server.addr = addr;
        }
        if let Some(root) = lookup("PAD_VIEWER_CONTENT_ROOT") {
            self.content.root = PathBuf::from(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.refresh.file_interval(), Duration::from_secs(50));
        assert_eq!(config.refresh.pad_interval(), Duration::from_secs(5));
        assert_eq!(config.refresh.idle_interval(), Duration::from_millis(500));
        assert_eq!(config.refresh.view_idle(), Duration::from_secs(300));
        assert_eq!(config.refresh.sweep_interval(), Duration::from_secs(75));
        assert_eq!(config.etherpad.timeout(), Duration::from_secs(1));
        assert_eq!(config.content.mode, ContentMode::Backend);
        assert_eq!(config.server.print_stylesheet, "/pdf.css");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
refresh:
  pad_interval_ms: 2000
etherpad:
  base_url: "http://pads.internal:9001/api/1"
content:
  mode: http
  api_base_url: "http://viewer.internal"
"#;
        let config = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.refresh.pad_interval_ms, 2000);
        assert_eq!(config.refresh.file_interval_ms, 50_000);
        assert_eq!(config.etherpad.base_url, "http://pads.internal:9001/api/1");
        assert_eq!(config.content.mode, ContentMode::Http);
        assert_eq!(config.server.addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ViewerConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.refresh.pad_interval_ms, 5_000);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(ViewerConfig::from_yaml("refresh: [1, 2").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ETHERPAD_API_KEY", "secret"),
            ("PAD_VIEWER_ADDR", "127.0.0.1:8080"),
            ("PAD_VIEWER_CONTENT_ROOT", "/srv/docs"),
        ]
        .into_iter()
        .collect();

        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.etherpad.api_key, "secret");
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.content.root, PathBuf::from("/srv/docs"));
        assert_eq!(config.etherpad.base_url, "http://localhost:9001/api/1");
    }
}
