//! Pawnbridge Configuration
//!
//! Loads the plugin's JSON configuration file: which script resources to
//! load, how to start the embedded engine, and how noisy to be. Every
//! field has a default so an empty file (or none at all) still yields a
//! working setup.

use serde::Deserialize;
use std::path::Path;

/// The plugin's config file name, looked up in the server root.
pub const DEFAULT_CONFIG_FILE: &str = "pawnbridge.json";

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Log verbosity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string for the tracing subscriber's env filter.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Script file the main resource starts from.
    pub entry_file: String,

    /// Flags handed to the embedded engine at initialization.
    pub engine_flags: Vec<String>,

    /// Script resources loaded at startup, in order.
    pub resources: Vec<String>,

    /// Log verbosity for the whole plugin.
    pub log_level: LogLevel,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            entry_file: "index.js".to_string(),
            engine_flags: Vec::new(),
            resources: vec!["main".to_string()],
            log_level: LogLevel::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `pawnbridge.json` from the working directory, falling back
    /// to defaults when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }
}
