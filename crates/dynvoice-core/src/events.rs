//! Events delivered by the platform gateway.

use dynvoice_ledger::{ChannelId, GuildId, SeedChannel};
use serde::{Deserialize, Serialize};

/// Full channel list of a guild, delivered once when the guild becomes available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSnapshot {
    pub guild_id: GuildId,
    #[serde(default)]
    pub channels: Vec<SeedChannel>,
}

/// A participant's voice connection changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateUpdate {
    pub guild_id: GuildId,
    /// Participant the update is about. Only used for logging.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Channel the participant was connected to before the update.
    #[serde(default)]
    pub before: Option<ChannelId>,
    /// Channel the participant is connected to now.
    #[serde(default)]
    pub after: Option<ChannelId>,
}

impl VoiceStateUpdate {
    /// Participant connected to `channel` from nowhere.
    pub fn join(guild_id: impl Into<GuildId>, channel: impl Into<ChannelId>) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: None,
            before: None,
            after: Some(channel.into()),
        }
    }

    /// Participant disconnected from `channel`.
    pub fn leave(guild_id: impl Into<GuildId>, channel: impl Into<ChannelId>) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: None,
            before: Some(channel.into()),
            after: None,
        }
    }

    /// Participant moved between two channels.
    pub fn moved(
        guild_id: impl Into<GuildId>,
        from: impl Into<ChannelId>,
        to: impl Into<ChannelId>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: None,
            before: Some(from.into()),
            after: Some(to.into()),
        }
    }

    /// Classify the update.
    pub fn transition(&self) -> Transition<'_> {
        match (self.before.as_ref(), self.after.as_ref()) {
            (None, Some(to)) => Transition::Join { to },
            (Some(from), None) => Transition::Leave { from },
            (Some(from), Some(to)) => Transition::Move { from, to },
            (None, None) => Transition::Idle,
        }
    }
}

/// What a voice-state update means for occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    Join { to: &'a ChannelId },
    Leave { from: &'a ChannelId },
    /// Also covers updates that stay in one channel (mute, deafen).
    Move { from: &'a ChannelId, to: &'a ChannelId },
    /// Neither side names a channel.
    Idle,
}

impl<'a> Transition<'a> {
    /// Channel gaining a participant.
    pub fn joined(&self) -> Option<&'a ChannelId> {
        match *self {
            Transition::Join { to } | Transition::Move { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Channel losing a participant.
    pub fn left(&self) -> Option<&'a ChannelId> {
        match *self {
            Transition::Leave { from } | Transition::Move { from, .. } => Some(from),
            _ => None,
        }
    }
}

/// Events the supervisor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GatewayEvent {
    GuildCreate(GuildSnapshot),
    VoiceStateUpdate(VoiceStateUpdate),
}

impl GatewayEvent {
    /// Guild the event belongs to.
    pub fn guild_id(&self) -> &GuildId {
        match self {
            GatewayEvent::GuildCreate(s) => &s.guild_id,
            GatewayEvent::VoiceStateUpdate(u) => &u.guild_id,
        }
    }
}
