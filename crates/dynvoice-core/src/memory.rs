//! In-memory platform.
//!
//! Stands in for the real channel API in dry-run mode and in tests. Channels
//! get sequential ids (`mem-1`, `mem-2`, ...) and the most recent calls are
//! recorded.
//! Failures can be queued per operation to exercise error paths.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use dynvoice_ledger::{ChannelId, GuildId};

use crate::error::{ManagerError, Result};
use crate::manager::{ChannelInfo, ChannelManager, CreatedChannel};

/// A call received by the in-memory platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCall {
    Create {
        guild: GuildId,
        name: String,
        parent: ChannelId,
    },
    Delete(ChannelId),
    Reparent {
        channel: ChannelId,
        parent: ChannelId,
        position: i64,
    },
    Get(ChannelId),
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Delete,
    Reparent,
    Get,
}

/// Calls kept in the log; older ones are dropped.
pub const CALL_LOG_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Platform {
    next_id: u64,
    channels: BTreeMap<ChannelId, ChannelInfo>,
    calls: VecDeque<ManagerCall>,
    /// Pending failures per operation.
    failures: HashMap<Operation, usize>,
}

impl Platform {
    fn record(&mut self, call: ManagerCall) {
        if self.calls.len() == CALL_LOG_CAPACITY {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
    }

    fn take_failure(&mut self, op: Operation) -> Result<()> {
        match self.failures.get_mut(&op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(ManagerError::Rejected(format!("{:?} failure injected", op)))
            }
            _ => Ok(()),
        }
    }

    fn next_position(&self) -> i64 {
        self.channels
            .values()
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Channel manager backed by a map in memory.
#[derive(Debug, Default)]
pub struct MemoryChannelManager {
    inner: Mutex<Platform>,
}

impl MemoryChannelManager {
    /// Create an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    fn platform(&self) -> MutexGuard<'_, Platform> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a pre-existing channel.
    pub fn add_channel(&self, info: ChannelInfo) {
        self.platform().channels.insert(info.id.clone(), info);
    }

    /// Make the next `count` calls of `op` fail.
    pub fn fail_next(&self, op: Operation, count: usize) {
        *self.platform().failures.entry(op).or_insert(0) += count;
    }

    /// Look up a channel.
    pub fn channel(&self, id: &ChannelId) -> Option<ChannelInfo> {
        self.platform().channels.get(id).cloned()
    }

    /// Number of channels on the platform.
    pub fn channel_count(&self) -> usize {
        self.platform().channels.len()
    }

    /// The most recent calls, oldest first.
    pub fn calls(&self) -> Vec<ManagerCall> {
        self.platform().calls.iter().cloned().collect()
    }

    /// Names passed to successful and failed create calls, in order.
    pub fn created_names(&self) -> Vec<String> {
        self.platform()
            .calls
            .iter()
            .filter_map(|c| match c {
                ManagerCall::Create { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Channels passed to delete calls, in order.
    pub fn deleted(&self) -> Vec<ChannelId> {
        self.platform()
            .calls
            .iter()
            .filter_map(|c| match c {
                ManagerCall::Delete(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChannelManager for MemoryChannelManager {
    async fn create_voice_channel(
        &self,
        guild: &GuildId,
        name: &str,
        parent: &ChannelId,
    ) -> Result<CreatedChannel> {
        let mut platform = self.platform();
        platform.record(ManagerCall::Create {
            guild: guild.clone(),
            name: name.to_string(),
            parent: parent.clone(),
        });
        platform.take_failure(Operation::Create)?;

        platform.next_id += 1;
        let id = ChannelId::new(format!("mem-{}", platform.next_id));
        let position = platform.next_position();
        platform.channels.insert(
            id.clone(),
            ChannelInfo {
                id: id.clone(),
                name: name.to_string(),
                parent: Some(parent.clone()),
                position,
            },
        );

        tracing::info!(guild = %guild, channel = %id, name, "dry-run: created voice channel");
        Ok(CreatedChannel {
            id,
            name: name.to_string(),
            position,
        })
    }

    async fn delete_channel(&self, channel: &ChannelId) -> Result<()> {
        let mut platform = self.platform();
        platform.record(ManagerCall::Delete(channel.clone()));
        platform.take_failure(Operation::Delete)?;

        match platform.channels.remove(channel) {
            Some(info) => {
                tracing::info!(channel = %channel, name = %info.name, "dry-run: deleted channel");
                Ok(())
            }
            None => Err(ManagerError::NotFound(channel.clone())),
        }
    }

    async fn reparent_and_position(
        &self,
        channel: &ChannelId,
        parent: &ChannelId,
        position: i64,
    ) -> Result<()> {
        let mut platform = self.platform();
        platform.record(ManagerCall::Reparent {
            channel: channel.clone(),
            parent: parent.clone(),
            position,
        });
        platform.take_failure(Operation::Reparent)?;

        let info = platform
            .channels
            .get_mut(channel)
            .ok_or_else(|| ManagerError::NotFound(channel.clone()))?;
        info.parent = Some(parent.clone());
        info.position = position;
        tracing::debug!(channel = %channel, parent = %parent, position, "dry-run: moved channel");
        Ok(())
    }

    async fn get_channel(&self, channel: &ChannelId) -> Result<ChannelInfo> {
        let mut platform = self.platform();
        platform.record(ManagerCall::Get(channel.clone()));
        platform.take_failure(Operation::Get)?;

        platform
            .channels
            .get(channel)
            .cloned()
            .ok_or_else(|| ManagerError::NotFound(channel.clone()))
    }
}
