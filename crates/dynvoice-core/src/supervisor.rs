//! Registry of managed guilds and the entry point for gateway events.

use std::collections::HashMap;
use std::sync::Arc;

use dynvoice_ledger::{GuildId, LedgerSnapshot};
use serde::Serialize;

use crate::config::GuildConfig;
use crate::events::{GatewayEvent, GuildSnapshot, VoiceStateUpdate};
use crate::guild::GuildContext;
use crate::manager::ChannelManager;
use crate::reconciler::{Reconciler, SweepReport};

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The snapshot seeded the guild.
    Seeded { channels: usize },
    /// The guild had already been seeded; the snapshot was ignored.
    AlreadySeeded,
    /// A voice-state update was applied and swept.
    Swept(SweepReport),
    /// The event names a guild that is not configured.
    UnknownGuild,
}

/// Status of one guild, as reported to operators.
#[derive(Debug, Clone, Serialize)]
pub struct GuildStatus {
    pub guild_id: GuildId,
    pub category_id: dynvoice_ledger::ChannelId,
    #[serde(flatten)]
    pub ledger: LedgerSnapshot,
}

/// Owns every managed guild and routes events to them.
///
/// The guild set is fixed at construction. Each guild has its own lock, so
/// events for different guilds are handled independently.
#[derive(Debug)]
pub struct Supervisor {
    guilds: HashMap<GuildId, Arc<GuildContext>>,
    reconciler: Reconciler,
}

impl Supervisor {
    /// Build the registry from configuration. The first config for a guild wins.
    pub fn new<I>(configs: I, manager: Arc<dyn ChannelManager>) -> Self
    where
        I: IntoIterator<Item = GuildConfig>,
    {
        let mut guilds = HashMap::new();
        for config in configs {
            guilds
                .entry(config.guild_id.clone())
                .or_insert_with(|| Arc::new(GuildContext::new(config)));
        }

        tracing::info!(guilds = guilds.len(), "supervisor ready");
        Self {
            guilds,
            reconciler: Reconciler::new(manager),
        }
    }

    /// Number of managed guilds.
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    /// Check if no guild is managed.
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }

    /// Route an event to its guild.
    pub async fn dispatch(&self, event: GatewayEvent) -> Outcome {
        match event {
            GatewayEvent::GuildCreate(snapshot) => self.on_guild_create(&snapshot).await,
            GatewayEvent::VoiceStateUpdate(update) => self.on_voice_state_update(&update).await,
        }
    }

    /// Seed a guild from its snapshot, once.
    pub async fn on_guild_create(&self, snapshot: &GuildSnapshot) -> Outcome {
        let Some(guild) = self.guilds.get(&snapshot.guild_id) else {
            tracing::debug!(guild = %snapshot.guild_id, "snapshot for unmanaged guild ignored");
            return Outcome::UnknownGuild;
        };

        if self.reconciler.seed(guild, snapshot).await {
            let channels = guild.lock().await.len();
            Outcome::Seeded { channels }
        } else {
            Outcome::AlreadySeeded
        }
    }

    /// Apply a voice-state change to its guild.
    pub async fn on_voice_state_update(&self, update: &VoiceStateUpdate) -> Outcome {
        let Some(guild) = self.guilds.get(&update.guild_id) else {
            tracing::debug!(guild = %update.guild_id, "voice update for unmanaged guild ignored");
            return Outcome::UnknownGuild;
        };

        Outcome::Swept(self.reconciler.handle_voice_state(guild, update).await)
    }

    /// Status of every guild, sorted by guild id.
    pub async fn status(&self) -> Vec<GuildStatus> {
        let mut ids: Vec<&GuildId> = self.guilds.keys().collect();
        ids.sort();

        let mut status = Vec::with_capacity(ids.len());
        for id in ids {
            let guild = &self.guilds[id];
            status.push(GuildStatus {
                guild_id: id.clone(),
                category_id: guild.config().category_id.clone(),
                ledger: guild.snapshot().await,
            });
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ChannelInfo;
    use crate::memory::MemoryChannelManager;
    use dynvoice_ledger::{ChannelId, SeedChannel};

    const GUILD: &str = "g";

    fn supervisor() -> (Arc<MemoryChannelManager>, Supervisor) {
        let platform = Arc::new(MemoryChannelManager::new());
        platform.add_channel(ChannelInfo {
            id: ChannelId::new("home"),
            name: "Voice 1".to_string(),
            parent: Some(ChannelId::new("cat")),
            position: 0,
        });
        let supervisor = Supervisor::new(
            vec![GuildConfig::new(GUILD, "cat", "Voice")],
            platform.clone(),
        );
        (platform, supervisor)
    }

    fn snapshot() -> GuildSnapshot {
        GuildSnapshot {
            guild_id: GuildId::new(GUILD),
            channels: vec![SeedChannel::new("home", "Voice 1", Some(ChannelId::new("cat")))],
        }
    }

    fn channel_count(status: &[GuildStatus]) -> usize {
        status[0].ledger.channels.len()
    }

    #[tokio::test]
    async fn seeds_once() {
        let (_, supervisor) = supervisor();

        assert_eq!(
            supervisor.dispatch(GatewayEvent::GuildCreate(snapshot())).await,
            Outcome::Seeded { channels: 1 }
        );
        assert_eq!(
            supervisor.dispatch(GatewayEvent::GuildCreate(snapshot())).await,
            Outcome::AlreadySeeded
        );
    }

    #[tokio::test]
    async fn ignores_unmanaged_guilds() {
        let (platform, supervisor) = supervisor();

        let mut other = snapshot();
        other.guild_id = GuildId::new("other");
        assert_eq!(
            supervisor.dispatch(GatewayEvent::GuildCreate(other)).await,
            Outcome::UnknownGuild
        );
        assert_eq!(
            supervisor
                .dispatch(GatewayEvent::VoiceStateUpdate(VoiceStateUpdate::join("other", "home")))
                .await,
            Outcome::UnknownGuild
        );
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn round_trip_converges_to_home_channel() {
        let (platform, supervisor) = supervisor();
        supervisor.on_guild_create(&snapshot()).await;

        // Each participant joins whatever channel is currently the spare tail.
        let mut joined = Vec::new();
        let mut tail = ChannelId::new("home");
        for _ in 0..5 {
            let outcome = supervisor
                .on_voice_state_update(&VoiceStateUpdate::join(GUILD, tail.as_str()))
                .await;
            let Outcome::Swept(report) = outcome else {
                panic!("expected a sweep, got {:?}", outcome);
            };
            assert_eq!(report.created.len(), 1);
            joined.push(tail);
            tail = report.created[0].clone();
        }

        let status = supervisor.status().await;
        assert_eq!(channel_count(&status), 6);
        let names: Vec<&str> = status[0].ledger.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Voice 1", "Voice 2", "Voice 3", "Voice 4", "Voice 5", "Voice 6"]
        );

        for channel in &joined {
            supervisor
                .on_voice_state_update(&VoiceStateUpdate::leave(GUILD, channel.as_str()))
                .await;
        }

        // The last delete shifts the spare into the freed slot; it goes on the next event.
        assert_eq!(channel_count(&supervisor.status().await), 2);
        supervisor
            .on_voice_state_update(&VoiceStateUpdate::leave(GUILD, "afk"))
            .await;

        let status = supervisor.status().await;
        assert_eq!(channel_count(&status), 1);
        assert_eq!(status[0].ledger.channels[0].id, ChannelId::new("home"));
        assert_eq!(status[0].ledger.channels[0].occupancy, 0);
        assert_eq!(platform.channel_count(), 1);
    }

    #[tokio::test]
    async fn leaving_in_reverse_order_also_converges() {
        let (_, supervisor) = supervisor();
        supervisor.on_guild_create(&snapshot()).await;

        let mut joined = Vec::new();
        let mut tail = ChannelId::new("home");
        for _ in 0..4 {
            let outcome = supervisor
                .on_voice_state_update(&VoiceStateUpdate::join(GUILD, tail.as_str()))
                .await;
            let Outcome::Swept(report) = outcome else {
                panic!("expected a sweep, got {:?}", outcome);
            };
            joined.push(tail);
            tail = report.created[0].clone();
        }

        for channel in joined.iter().rev() {
            supervisor
                .on_voice_state_update(&VoiceStateUpdate::leave(GUILD, channel.as_str()))
                .await;
        }

        assert_eq!(channel_count(&supervisor.status().await), 1);
    }

    #[tokio::test]
    async fn concurrent_joins_leave_one_spare() {
        let (_, supervisor) = supervisor();
        let supervisor = Arc::new(supervisor);
        supervisor.on_guild_create(&snapshot()).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let supervisor = Arc::clone(&supervisor);
            handles.push(tokio::spawn(async move {
                supervisor
                    .on_voice_state_update(&VoiceStateUpdate::join(GUILD, "home"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let status = supervisor.status().await;
        let occupancy: Vec<u32> = status[0].ledger.channels.iter().map(|c| c.occupancy).collect();
        assert_eq!(occupancy, vec![8, 0]);
    }
}
