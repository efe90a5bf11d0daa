//! Bootstrap configuration loaded from TOML
//!
//! Each binary resolves its settings in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled by clap on each flag)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The config file itself is located by `--config`, then `CHURN_CONFIG`,
//! then `~/.config/churn/config.toml`. A missing file is not an error: the
//! binaries log a warning and continue on defaults. A file that exists but
//! does not parse is a startup error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CHURN_CONFIG";

/// Full TOML file; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub gate: GateConfig,
    pub logging: LoggingConfig,
}

/// `[api]` section, prediction service bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Serialized model artifact loaded at startup
    pub model_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from("modelo_churn.json"),
        }
    }
}

/// `[ui]` section, form client bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub host: String,
    pub port: u16,
    /// Full URL of the prediction endpoint
    pub backend_url: String,
    /// Per-request timeout towards the prediction service
    pub timeout_secs: u64,
    /// Idle time after which a browser session and its history are dropped
    pub session_ttl_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            backend_url: "http://127.0.0.1:8000/predict".to_string(),
            timeout_secs: 10,
            session_ttl_secs: 3600,
        }
    }
}

/// `[gate]` section, offline performance gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub model_path: PathBuf,
    pub data_path: PathBuf,
    pub min_accuracy: f64,
    pub min_f1: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("modelo_churn.json"),
            data_path: PathBuf::from("test_data.csv"),
            min_accuracy: 0.80,
            min_f1: 0.75,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file that is known to exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the config file location and load it, falling back to defaults
    /// when there is no file
    ///
    /// Runs before tracing is installed, so nothing is logged here. Callers
    /// report the returned [`ConfigOrigin`] once logging is up.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        let Some(path) = resolve_config_path(cli_path) else {
            return Ok((Self::default(), ConfigOrigin::Defaults));
        };

        if !path.exists() {
            return Ok((Self::default(), ConfigOrigin::Missing(path)));
        }

        let config = Self::load(&path)?;
        Ok((config, ConfigOrigin::File(path)))
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// A file was requested but does not exist; defaults are in effect
    Missing(PathBuf),
    /// No file was requested and none exists in the user config dir
    Defaults,
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigOrigin::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigOrigin::Defaults => info!("No config file, using built-in defaults"),
        }
    }
}

/// Locate the config file: CLI argument, then environment, then user config dir
///
/// Returns `None` only when nothing was requested and no user config exists.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("churn").join("config.toml"))
        .filter(|p| p.exists())
}
