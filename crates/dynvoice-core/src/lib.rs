//! dynvoice core - keeps a guild's voice channels sized to its occupancy
//!
//! Each managed guild has a category holding voice channels named
//! `"{prefix} 1"`, `"{prefix} 2"`, ... As participants join and leave, the
//! [`Reconciler`] creates a new channel whenever the last one gets occupied
//! and deletes trailing channels that are empty behind another empty one.
//!
//! # Architecture
//!
//! - **Ledger** ([`dynvoice_ledger`]): ordered channel registry with occupancy
//! - **GuildContext**: one guild's config plus its ledger behind a lock
//! - **Reconciler**: occupancy updates and the create/delete sweep
//! - **ChannelManager**: the platform calls the reconciler makes
//! - **Supervisor**: every configured guild, plus event routing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dynvoice_core::{GatewayEvent, GuildConfig, MemoryChannelManager, Supervisor, VoiceStateUpdate};
//!
//! # async fn run() {
//! let platform = Arc::new(MemoryChannelManager::new());
//! let supervisor = Supervisor::new(vec![GuildConfig::new("1", "2", "Voice")], platform);
//! let update = VoiceStateUpdate::join("1", "10");
//! supervisor.dispatch(GatewayEvent::VoiceStateUpdate(update)).await;
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod guild;
pub mod manager;
pub mod memory;
pub mod reconciler;
pub mod supervisor;

pub use config::{parse_categories, GuildConfig, LogLevel};
pub use error::{ConfigError, ManagerError, Result};
pub use events::{GatewayEvent, GuildSnapshot, Transition, VoiceStateUpdate};
pub use guild::GuildContext;
pub use manager::{ChannelInfo, ChannelManager, CreatedChannel};
pub use memory::{ManagerCall, MemoryChannelManager, Operation};
pub use reconciler::{Reconciler, SweepReport};
pub use supervisor::{GuildStatus, Outcome, Supervisor};

pub use dynvoice_ledger::{ChannelEntry, ChannelId, ChannelLedger, GuildId, LedgerSnapshot, SeedChannel};
