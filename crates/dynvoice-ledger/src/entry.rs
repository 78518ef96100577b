//! Ledger entry types.

use crate::id::{ChannelId, GuildId};

/// One managed voice channel and the number of participants connected to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelEntry {
    /// Platform id of the channel.
    pub id: ChannelId,
    /// Display name, `"{prefix} {ordinal}"` for channels we created.
    pub name: String,
    /// Connected participants. Maintained incrementally, never recomputed.
    pub occupancy: u32,
}

impl ChannelEntry {
    /// Create an empty entry.
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            occupancy: 0,
        }
    }

    /// Create an entry with a given occupancy.
    pub fn with_occupancy(id: ChannelId, name: impl Into<String>, occupancy: u32) -> Self {
        Self {
            id,
            name: name.into(),
            occupancy,
        }
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    /// Apply a signed change, clamping at zero.
    pub(crate) fn apply(&mut self, delta: i32) -> u32 {
        self.occupancy = if delta >= 0 {
            self.occupancy.saturating_add(delta.unsigned_abs())
        } else {
            self.occupancy.saturating_sub(delta.unsigned_abs())
        };
        self.occupancy
    }
}

/// A channel as it appears in the guild snapshot delivered on connect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedChannel {
    /// Platform id of the channel.
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Category the channel lives under, if any.
    #[cfg_attr(feature = "serde", serde(default, alias = "parent_id"))]
    pub parent: Option<ChannelId>,
    /// Guild the channel belongs to. Snapshots may omit it.
    #[cfg_attr(feature = "serde", serde(default, alias = "guild_id"))]
    pub guild: Option<GuildId>,
}

impl SeedChannel {
    /// Create a snapshot channel under `parent`.
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>, parent: Option<ChannelId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent,
            guild: None,
        }
    }

    /// Whether the channel lives directly under `category`.
    pub fn is_under(&self, category: &ChannelId) -> bool {
        self.parent.as_ref() == Some(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_clamps_at_zero() {
        let mut entry = ChannelEntry::new(ChannelId::new("1"), "Voice 1");
        assert_eq!(entry.apply(-1), 0);
        assert_eq!(entry.apply(3), 3);
        assert_eq!(entry.apply(-5), 0);
        assert!(entry.is_empty());
    }

    #[test]
    fn seed_channel_parent_match() {
        let category = ChannelId::new("cat");
        let inside = SeedChannel::new("1", "Voice 1", Some(category.clone()));
        let outside = SeedChannel::new("2", "Voice 2", Some(ChannelId::new("other")));
        let orphan = SeedChannel::new("3", "Voice 3", None);

        assert!(inside.is_under(&category));
        assert!(!outside.is_under(&category));
        assert!(!orphan.is_under(&category));
    }
}
