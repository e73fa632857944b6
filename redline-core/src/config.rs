//! Configuration management for Redline
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REDLINE_*)
//! 3. Config file (~/.config/redline/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;
use crate::{Error, Result};

/// Readback timeouts and poll cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long the locator may wait for a collapsed diff to hydrate
    #[serde(with = "humantime_serde")]
    pub locate: Duration,

    /// How long each per-annotation confirmation may take
    #[serde(with = "humantime_serde")]
    pub confirm: Duration,

    /// How long the final review submission may take to confirm
    #[serde(with = "humantime_serde")]
    pub finalize: Duration,

    /// Interval between readback probes
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            locate: Duration::from_secs(10),
            confirm: Duration::from_secs(15),
            finalize: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl TimeoutConfig {
    /// Session options derived from these timeouts
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            confirm_timeout: self.confirm,
            finalize_timeout: self.finalize,
            poll_interval: self.poll_interval,
        }
    }
}

/// Browser driver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Path to the node executable running the driver sidecar
    pub node_path: String,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Browser profile directory holding the logged-in session
    ///
    /// Annotation placement needs an authenticated page; without a profile
    /// the pending-review controls never render.
    pub profile_dir: Option<PathBuf>,

    /// Override the embedded driver script with an external copy
    pub driver_script: Option<PathBuf>,

    /// Base URL of the hosting platform
    pub base_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_path: "node".to_string(),
            headless: true,
            profile_dir: None,
            driver_script: None,
            base_url: "https://github.com".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Browser configuration
    pub browser: BrowserConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/redline/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("redline").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REDLINE_NODE_PATH: Path to the node executable
    /// - REDLINE_PROFILE_DIR: Browser profile directory
    /// - REDLINE_BASE_URL: Hosting platform base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(node_path) = std::env::var("REDLINE_NODE_PATH") {
            self.browser.node_path = node_path;
        }

        if let Ok(profile_dir) = std::env::var("REDLINE_PROFILE_DIR") {
            self.browser.profile_dir = Some(PathBuf::from(profile_dir));
        }

        if let Ok(base_url) = std::env::var("REDLINE_BASE_URL") {
            self.browser.base_url = base_url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, node_path: Option<String>, headful: bool) -> Self {
        if let Some(path) = node_path {
            self.browser.node_path = path;
        }

        if headful {
            self.browser.headless = false;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(node_path: Option<String>, headful: bool) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(node_path, headful))
    }
}
