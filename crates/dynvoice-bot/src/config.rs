//! Daemon configuration.
//!
//! Values come from an optional YAML file overlaid by environment variables:
//!
//! | key            | env                     | default                        |
//! |----------------|-------------------------|--------------------------------|
//! | `token`        | `DYNVOICE_TOKEN`        | none (required unless dry run) |
//! | `loglevel`     | `DYNVOICE_LOG_LEVEL`    | `error`                        |
//! | `category`     | `DYNVOICE_CATEGORIES`   | empty                          |
//! | `api_base`     | `DYNVOICE_API_BASE`     | `https://discord.com/api/v10`  |
//! | `event_socket` | `DYNVOICE_EVENT_SOCKET` | `./dynvoice.sock`              |
//! | `dry_run`      | `DYNVOICE_DRY_RUN`      | `false`                        |
//!
//! The file is read from `DYNVOICE_CONFIG`, or `./config.yml` when it exists.

use std::path::{Path, PathBuf};

use dynvoice_core::{parse_categories, ConfigError, GuildConfig, LogLevel};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default platform API base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default event socket path.
pub const DEFAULT_EVENT_SOCKET: &str = "./dynvoice.sock";

/// Default config file, used only when present.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub token: Option<String>,
    pub loglevel: Option<String>,
    pub category: Option<String>,
    pub api_base: Option<String>,
    pub event_socket: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Configuration for the dynvoice daemon.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot token for the platform API.
    pub token: Option<String>,

    /// Log verbosity as written in configuration.
    pub log_level: Option<String>,

    /// Raw `guild:category:prefix` list.
    pub categories: String,

    /// Platform API base URL.
    pub api_base: String,

    /// Unix socket the event feed connects to.
    pub event_socket: PathBuf,

    /// Use the in-memory platform instead of the API.
    pub dry_run: bool,
}

impl BotConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let file = match std::env::var("DYNVOICE_CONFIG") {
            Ok(path) => FileConfig::load(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => FileConfig::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file values with an environment lookup; the environment wins.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dry_run = match env("DYNVOICE_DRY_RUN") {
            Some(v) => parse_flag(&v)
                .ok_or_else(|| Error::Config(format!("invalid DYNVOICE_DRY_RUN: {}", v)))?,
            None => file.dry_run.unwrap_or(false),
        };

        let config = Self {
            token: env("DYNVOICE_TOKEN").or(file.token).filter(|t| !t.trim().is_empty()),
            log_level: env("DYNVOICE_LOG_LEVEL").or(file.loglevel),
            categories: env("DYNVOICE_CATEGORIES").or(file.category).unwrap_or_default(),
            api_base: env("DYNVOICE_API_BASE")
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            event_socket: env("DYNVOICE_EVENT_SOCKET")
                .map(PathBuf::from)
                .or(file.event_socket)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EVENT_SOCKET)),
            dry_run,
        };

        if config.token.is_none() && !config.dry_run {
            return Err(Error::Config(
                "no token configured (set DYNVOICE_TOKEN or enable dry run)".to_string(),
            ));
        }

        Ok(config)
    }

    /// Configured log verbosity. Unset means the default.
    pub fn log_level(&self) -> std::result::Result<LogLevel, ConfigError> {
        match &self.log_level {
            Some(level) => level.parse(),
            None => Ok(LogLevel::default()),
        }
    }

    /// Managed guilds. Malformed entries are logged and skipped.
    pub fn guilds(&self) -> Vec<GuildConfig> {
        parse_categories(&self.categories)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
