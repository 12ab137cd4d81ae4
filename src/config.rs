//! Configuration for the reading core.
//!
//! All tunables are centralized here and loaded from a TOML file if present.
//! Any missing or invalid entries fall back to sensible defaults so the core
//! can still start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Core configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoreConfig {
    /// Base address of the remote content server.
    #[serde(default = "default_address")]
    pub address: String,
    /// Page capacity, measured in UTF-16 code units.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Whether chapter-load failures are written to the error log.
    #[serde(default)]
    pub error_logging: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            address: default_address(),
            page_size: default_page_size(),
            error_logging: false,
            log_level: LogLevel::default(),
        }
    }
}

impl CoreConfig {
    /// Clamp values that would break pagination or the API client.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        while self.address.ends_with('/') {
            self.address.pop();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> CoreConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded core config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return CoreConfig::default();
        }
    };

    match toml::from_str::<CoreConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg.normalized()
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            CoreConfig::default()
        }
    }
}

fn default_address() -> String {
    "http://127.0.0.1:1122".to_string()
}

fn default_page_size() -> usize {
    600
}
