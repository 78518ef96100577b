//! Error types for dynvoice-core.

use dynvoice_ledger::ChannelId;
use thiserror::Error;

/// Result type for channel-management calls.
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Errors reported by a [`ChannelManager`](crate::ChannelManager).
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The platform answered with a non-success status.
    #[error("platform API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never got an answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The channel does not exist on the platform.
    #[error("channel not found: {0}")]
    NotFound(ChannelId),

    /// The platform answered with something we could not use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call was refused before reaching the platform.
    #[error("call rejected: {0}")]
    Rejected(String),
}

/// Errors raised while interpreting configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A category mapping was not `guild:category:prefix`.
    #[error("invalid format for categories: {0}")]
    InvalidCategory(String),

    /// A log verbosity name we do not recognise.
    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),
}
