//! Occupancy reconciler.
//!
//! After every voice-state change the reconciler walks the guild's ordered
//! channel sequence once (a *sweep*) and applies two rules:
//!
//! - **Collapse**: a channel at position `i > 0` is deleted when both it and
//!   the channel before it are empty. Position 0 is the home channel and is
//!   never deleted.
//! - **Grow**: when the last channel has anyone in it, a new channel named
//!   `"{prefix} {i + 2}"` is created under the managed category, placed right
//!   after its predecessor, and appended to the sequence.
//!
//! A sweep deletes at most every other channel of an empty run, so long runs
//! shrink over successive events until one spare empty channel is left at the
//! tail.
//!
//! # Failure handling
//!
//! Platform failures are logged and counted, never retried here. A failed
//! delete still drops the channel from the ledger, so local state can drift
//! from the platform until the next snapshot. A failed create leaves the
//! ledger untouched.

use std::sync::Arc;

use dynvoice_ledger::{channel_name, ChannelEntry, ChannelId, ChannelLedger};
use tracing::{debug, error, warn};

use crate::config::GuildConfig;
use crate::events::{GuildSnapshot, VoiceStateUpdate};
use crate::guild::GuildContext;
use crate::manager::ChannelManager;

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Channels created, in creation order.
    pub created: Vec<ChannelId>,
    /// Channels dropped from the ledger, whether or not the platform delete succeeded.
    pub deleted: Vec<ChannelId>,
    /// Platform calls that failed.
    pub failures: usize,
}

impl SweepReport {
    /// Whether the sweep changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.failures == 0
    }
}

/// Applies voice-state changes to a guild and keeps its channel set in shape.
#[derive(Clone)]
pub struct Reconciler {
    manager: Arc<dyn ChannelManager>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler that acts through `manager`.
    pub fn new(manager: Arc<dyn ChannelManager>) -> Self {
        Self { manager }
    }

    /// Seed a guild from its snapshot. Returns `false` if it was already seeded.
    pub async fn seed(&self, guild: &GuildContext, snapshot: &GuildSnapshot) -> bool {
        guild.seed(snapshot.channels.iter().cloned()).await
    }

    /// Apply a voice-state change and sweep the guild.
    ///
    /// The occupancy update and the sweep run under the same guild lock.
    pub async fn handle_voice_state(
        &self,
        guild: &GuildContext,
        update: &VoiceStateUpdate,
    ) -> SweepReport {
        let mut ledger = guild.lock().await;

        let transition = update.transition();
        if let Some(to) = transition.joined() {
            ledger.adjust_occupancy(to, 1);
        }
        if let Some(from) = transition.left() {
            ledger.adjust_occupancy(from, -1);
        }
        debug!(
            guild = %update.guild_id,
            user = update.user_id.as_deref().unwrap_or("-"),
            ?transition,
            "voice state changed"
        );

        self.sweep(guild.config(), &mut ledger).await
    }

    /// Walk the ordered sequence once, collapsing empty runs and growing the tail.
    ///
    /// Positions `0..n` are visited with `n` fixed when the sweep starts.
    /// After a deletion the walk still moves on to the next position, so the
    /// channel that shifted into the freed slot waits for the next sweep, and
    /// positions past the shortened tail are skipped.
    pub async fn sweep(&self, config: &GuildConfig, ledger: &mut ChannelLedger) -> SweepReport {
        let mut report = SweepReport::default();
        let n = ledger.len();

        for i in 0..n {
            let Some(entry) = ledger.entry_at(i) else {
                continue;
            };
            let id = entry.id.clone();
            let occupancy = entry.occupancy;

            let prev_empty = i > 0 && ledger.entry_at(i - 1).is_some_and(ChannelEntry::is_empty);
            if occupancy == 0 && prev_empty {
                self.collapse(ledger, &id, &mut report).await;
                continue;
            }

            debug!(position = i, channel = %id, occupancy, "sweep");

            if i + 1 == ledger.len() && occupancy > 0 {
                self.grow(config, ledger, i, &id, &mut report).await;
            }
        }

        if !report.is_noop() {
            debug!(
                guild = %config.guild_id,
                created = report.created.len(),
                deleted = report.deleted.len(),
                failures = report.failures,
                channels = ledger.len(),
                "sweep finished"
            );
        }
        report
    }

    async fn collapse(&self, ledger: &mut ChannelLedger, id: &ChannelId, report: &mut SweepReport) {
        let Some(entry) = ledger.remove(id) else {
            return;
        };
        report.deleted.push(entry.id.clone());

        match self.manager.delete_channel(id).await {
            Ok(()) => debug!(channel = %id, name = %entry.name, "deleted empty channel"),
            Err(e) => {
                report.failures += 1;
                error!(channel = %id, name = %entry.name, "failed to delete channel: {}", e);
            }
        }
    }

    async fn grow(
        &self,
        config: &GuildConfig,
        ledger: &mut ChannelLedger,
        position: usize,
        previous: &ChannelId,
        report: &mut SweepReport,
    ) {
        let name = channel_name(&config.prefix, position + 2);

        let created = match self
            .manager
            .create_voice_channel(&config.guild_id, &name, &config.category_id)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                report.failures += 1;
                error!(guild = %config.guild_id, name = %name, "failed to create channel: {}", e);
                return;
            }
        };

        match self.manager.get_channel(previous).await {
            Ok(prev) => {
                if let Err(e) = self
                    .manager
                    .reparent_and_position(&created.id, &config.category_id, prev.position + 1)
                    .await
                {
                    report.failures += 1;
                    warn!(channel = %created.id, "failed to position new channel: {}", e);
                }
            }
            Err(e) => {
                report.failures += 1;
                warn!(
                    channel = %previous,
                    "failed to look up previous channel, leaving new channel unpositioned: {}",
                    e
                );
            }
        }

        debug!(channel = %created.id, name = %created.name, "created channel");
        report.created.push(created.id.clone());
        ledger.insert(ChannelEntry::new(created.id, created.name));
    }
}
