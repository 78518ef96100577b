//! dynvoice daemon
//!
//! Runs the channel reconciler against a real (or in-memory) platform.
//!
//! # Architecture
//!
//! - **Config**: YAML file plus environment overrides
//! - **Rest**: [`ChannelManager`](dynvoice_core::ChannelManager) over the platform HTTP API
//! - **Event socket**: Unix socket where the gateway bridge delivers events
//! - **Node**: owns the supervisor and serves the socket until shutdown
//!
//! # Example
//!
//! ```no_run
//! use dynvoice_bot::{BotConfig, BotNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_env()?;
//!     let guilds = config.guilds();
//!     BotNode::new(config, guilds)?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event_socket;
pub mod node;
pub mod rest;

pub use config::{BotConfig, FileConfig};
pub use error::{Error, Result};
pub use event_socket::{EventSocket, SocketCommand, SocketResponse};
pub use node::BotNode;
pub use rest::RestChannelManager;
