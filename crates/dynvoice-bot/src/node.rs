//! The daemon: wires configuration, the platform and the event socket together.

use std::sync::Arc;

use dynvoice_core::{ChannelManager, GuildConfig, MemoryChannelManager, Supervisor};

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::event_socket::EventSocket;
use crate::rest::RestChannelManager;

/// A running dynvoice instance.
pub struct BotNode {
    config: BotConfig,
    supervisor: Arc<Supervisor>,
    /// Set in dry run; snapshots are mirrored into it.
    dry_run_platform: Option<Arc<MemoryChannelManager>>,
}

impl BotNode {
    /// Build the platform client and the guild registry.
    pub fn new(config: BotConfig, guilds: Vec<GuildConfig>) -> Result<Self> {
        let mut dry_run_platform = None;
        let manager: Arc<dyn ChannelManager> = if config.dry_run {
            let platform = Arc::new(MemoryChannelManager::new());
            dry_run_platform = Some(Arc::clone(&platform));
            platform
        } else {
            let token = config
                .token
                .as_deref()
                .ok_or_else(|| Error::Config("no token configured".to_string()))?;
            Arc::new(RestChannelManager::new(&config.api_base, token)?)
        };

        if guilds.is_empty() {
            tracing::warn!("no guilds configured, every event will be ignored");
        }

        let supervisor = Arc::new(Supervisor::new(guilds, manager));
        Ok(Self {
            config,
            supervisor,
            dry_run_platform,
        })
    }

    /// Shared guild registry.
    pub fn supervisor(&self) -> Arc<Supervisor> {
        Arc::clone(&self.supervisor)
    }

    /// Serve the event socket until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        tracing::info!("dynvoice starting");
        tracing::info!("  Guilds: {}", self.supervisor.len());
        tracing::info!("  Events: {}", self.config.event_socket.display());
        if self.dry_run_platform.is_some() {
            tracing::info!("  Platform: in-memory (dry run)");
        } else {
            tracing::info!("  Platform: {}", self.config.api_base);
        }

        let mut socket = EventSocket::new(self.supervisor(), self.config.event_socket.clone());
        if let Some(platform) = &self.dry_run_platform {
            socket = socket.with_mirror(Arc::clone(platform));
        }

        // Failing to bind is fatal; everything after it only logs.
        let listener = socket.bind()?;
        let server = tokio::spawn(async move { socket.serve(listener).await });

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutting down");

        server.abort();
        let _ = std::fs::remove_file(&self.config.event_socket);
        Ok(())
    }
}
