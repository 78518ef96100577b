//! The channel-management capability the reconciler drives.

use async_trait::async_trait;
use dynvoice_ledger::{ChannelId, GuildId};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A channel freshly created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedChannel {
    pub id: ChannelId,
    pub name: String,
    pub position: i64,
}

/// Platform view of an existing channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<ChannelId>,
    pub position: i64,
}

/// Create, delete, move and inspect channels on the platform.
///
/// Calls are awaited while the guild lock is held, so implementations own
/// any timeout or retry policy.
#[async_trait]
pub trait ChannelManager: Send + Sync {
    /// Create a voice channel named `name` under `parent`.
    async fn create_voice_channel(
        &self,
        guild: &GuildId,
        name: &str,
        parent: &ChannelId,
    ) -> Result<CreatedChannel>;

    /// Delete a channel.
    async fn delete_channel(&self, channel: &ChannelId) -> Result<()>;

    /// Move a channel under `parent` at `position`.
    async fn reparent_and_position(
        &self,
        channel: &ChannelId,
        parent: &ChannelId,
        position: i64,
    ) -> Result<()>;

    /// Fetch a channel.
    async fn get_channel(&self, channel: &ChannelId) -> Result<ChannelInfo>;
}
