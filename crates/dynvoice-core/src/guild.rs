//! Per-guild state.

use dynvoice_ledger::{ChannelLedger, LedgerSnapshot, SeedChannel};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::GuildConfig;

/// Configuration and channel ledger of one managed guild.
///
/// The ledger sits behind the guild's own lock; holding it serializes
/// occupancy updates and sweeps for this guild without blocking others.
#[derive(Debug)]
pub struct GuildContext {
    config: GuildConfig,
    ledger: Mutex<ChannelLedger>,
}

impl GuildContext {
    /// Create an unseeded context.
    pub fn new(config: GuildConfig) -> Self {
        let ledger = Mutex::new(ChannelLedger::new(config.prefix.clone()));
        Self { config, ledger }
    }

    /// Guild configuration.
    pub fn config(&self) -> &GuildConfig {
        &self.config
    }

    /// Acquire the guild lock.
    pub async fn lock(&self) -> MutexGuard<'_, ChannelLedger> {
        self.ledger.lock().await
    }

    /// Whether the snapshot has been consumed.
    pub async fn is_initialized(&self) -> bool {
        self.ledger.lock().await.is_seeded()
    }

    /// Seed the ledger from the guild's snapshot.
    ///
    /// Keeps only channels under the managed category (and, when the snapshot
    /// says, in this guild). Returns `false` if the guild was already seeded.
    pub async fn seed<I>(&self, channels: I) -> bool
    where
        I: IntoIterator<Item = SeedChannel>,
    {
        let category = &self.config.category_id;
        let guild = &self.config.guild_id;
        let managed = channels.into_iter().filter(|c| {
            c.is_under(category) && c.guild.as_ref().map_or(true, |g| g == guild)
        });

        self.ledger.lock().await.seed(managed)
    }

    /// Copy of the ordered view.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().await.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynvoice_ledger::{ChannelId, GuildId};

    fn context() -> GuildContext {
        GuildContext::new(GuildConfig::new("g", "cat", "Voice"))
    }

    #[tokio::test]
    async fn seed_keeps_only_managed_category() {
        let guild = context();
        let category = Some(ChannelId::new("cat"));

        let mut foreign = SeedChannel::new("4", "Voice 4", category.clone());
        foreign.guild = Some(GuildId::new("other"));

        let seeded = guild
            .seed(vec![
                SeedChannel::new("2", "Voice 2", category.clone()),
                SeedChannel::new("1", "Voice 1", category.clone()),
                SeedChannel::new("x", "General", Some(ChannelId::new("text"))),
                SeedChannel::new("y", "Voice 9", None),
                foreign,
            ])
            .await;

        assert!(seeded);
        assert!(guild.is_initialized().await);
        let snapshot = guild.snapshot().await;
        let ids: Vec<&str> = snapshot.channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn second_seed_is_ignored() {
        let guild = context();
        let category = Some(ChannelId::new("cat"));

        assert!(guild.seed(vec![SeedChannel::new("1", "Voice 1", category.clone())]).await);
        assert!(!guild.seed(vec![SeedChannel::new("2", "Voice 2", category)]).await);
        assert_eq!(guild.snapshot().await.channels.len(), 1);
    }
}
