//! Per-guild configuration records and the parsers that produce them.

use std::collections::HashSet;
use std::str::FromStr;

use dynvoice_ledger::{ChannelId, GuildId};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable configuration of one managed guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// Guild being managed.
    pub guild_id: GuildId,
    /// Category every managed channel lives under.
    pub category_id: ChannelId,
    /// Name prefix of the managed channels.
    pub prefix: String,
}

impl GuildConfig {
    /// Create a guild configuration.
    pub fn new(
        guild_id: impl Into<GuildId>,
        category_id: impl Into<ChannelId>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            category_id: category_id.into(),
            prefix: prefix.into(),
        }
    }
}

impl FromStr for GuildConfig {
    type Err = ConfigError;

    /// Parse a single `guild:category:prefix` mapping.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let item = s.trim();
        let parts: Vec<&str> = item.split(':').collect();
        match parts.as_slice() {
            [guild, category, prefix] => Ok(GuildConfig::new(
                guild.trim(),
                category.trim(),
                prefix.trim(),
            )),
            _ => Err(ConfigError::InvalidCategory(item.to_string())),
        }
    }
}

/// Parse a comma-separated list of `guild:category:prefix` mappings.
///
/// Malformed items are logged and skipped. When a guild appears twice the
/// first mapping wins.
pub fn parse_categories(list: &str) -> Vec<GuildConfig> {
    let mut seen = HashSet::new();
    let mut configs = Vec::new();

    for item in list.split(',') {
        match item.parse::<GuildConfig>() {
            Ok(config) => {
                if seen.insert(config.guild_id.clone()) {
                    configs.push(config);
                } else {
                    tracing::debug!(guild = %config.guild_id, "duplicate category mapping ignored");
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }

    configs
}

/// Log verbosity accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Error,
    Warning,
    Informational,
    Debug,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Informational => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "logerror" | "error" => Ok(LogLevel::Error),
            "logwarning" | "warning" | "warn" => Ok(LogLevel::Warning),
            "loginformational" | "informational" | "info" => Ok(LogLevel::Informational),
            "logdebug" | "debug" => Ok(LogLevel::Debug),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }
}
