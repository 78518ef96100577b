//! Unix socket server feeding gateway events into the supervisor.
//!
//! The gateway bridge (or an operator with `dynvoice-ctl`) writes one JSON
//! object per line and receives one JSON response per line:
//!
//! ```text
//! {"event":"guild_create","guild_id":"1","channels":[{"id":"10","name":"Voice 1","parent_id":"2"}]}
//! {"event":"voice_state_update","guild_id":"1","user_id":"5","before":null,"after":"10"}
//! {"event":"status"}
//! {"event":"ping"}
//! ```
//!
//! Each line is handled to completion before the next one is read, so events
//! sent on one connection reach their guild in the order they were written.
//! The response to a gateway event is written once its sweep has finished.

use std::path::PathBuf;
use std::sync::Arc;

use dynvoice_core::{
    ChannelInfo, GatewayEvent, GuildSnapshot, GuildStatus, MemoryChannelManager, Outcome,
    Supervisor, VoiceStateUpdate,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

use crate::error::Result;

/// A line received on the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SocketCommand {
    /// Guild snapshot delivered on connect
    GuildCreate(GuildSnapshot),
    /// A participant's voice connection changed
    VoiceStateUpdate(VoiceStateUpdate),
    /// Report every guild's channels
    Status,
    /// Health check
    Ping,
}

/// Response written back for each line.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SocketResponse {
    Accepted,
    Guilds { guilds: Vec<GuildStatus> },
    Pong,
    Error { error: String },
}

/// Event socket server.
pub struct EventSocket {
    supervisor: Arc<Supervisor>,
    socket_path: PathBuf,
    mirror: Option<Arc<MemoryChannelManager>>,
}

impl EventSocket {
    /// Create a new event socket server.
    pub fn new(supervisor: Arc<Supervisor>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            supervisor,
            socket_path: socket_path.into(),
            mirror: None,
        }
    }

    /// Copy snapshot channels into an in-memory platform (dry run).
    pub fn with_mirror(mut self, platform: Arc<MemoryChannelManager>) -> Self {
        self.mirror = Some(platform);
        self
    }

    /// Bind the socket, replacing a stale socket file.
    pub fn bind(&self) -> Result<UnixListener> {
        let _ = std::fs::remove_file(&self.socket_path);
        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Event socket listening on {}", self.socket_path.display());
        Ok(listener)
    }

    /// Accept connections forever.
    pub async fn serve(&self, listener: UnixListener) {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let supervisor = Arc::clone(&self.supervisor);
                    let mirror = self.mirror.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, supervisor, mirror).await {
                            tracing::error!("Event connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept event connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    supervisor: Arc<Supervisor>,
    mirror: Option<Arc<MemoryChannelManager>>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        if line.trim().is_empty() {
            line.clear();
            continue;
        }

        let response = match serde_json::from_str::<SocketCommand>(&line) {
            Ok(cmd) => execute_command(cmd, &supervisor, mirror.as_deref()).await,
            Err(e) => SocketResponse::Error {
                error: format!("Invalid event: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

async fn execute_command(
    cmd: SocketCommand,
    supervisor: &Supervisor,
    mirror: Option<&MemoryChannelManager>,
) -> SocketResponse {
    let event = match cmd {
        SocketCommand::Status => {
            return SocketResponse::Guilds {
                guilds: supervisor.status().await,
            }
        }
        SocketCommand::Ping => return SocketResponse::Pong,
        SocketCommand::GuildCreate(snapshot) => {
            if let Some(platform) = mirror {
                mirror_snapshot(platform, &snapshot);
            }
            GatewayEvent::GuildCreate(snapshot)
        }
        SocketCommand::VoiceStateUpdate(update) => GatewayEvent::VoiceStateUpdate(update),
    };

    let guild = event.guild_id().clone();
    match supervisor.dispatch(event).await {
        Outcome::Seeded { channels } => tracing::info!(guild = %guild, channels, "guild seeded"),
        Outcome::AlreadySeeded => tracing::debug!(guild = %guild, "guild already seeded"),
        Outcome::Swept(report) => tracing::debug!(guild = %guild, ?report, "sweep done"),
        Outcome::UnknownGuild => {}
    }

    SocketResponse::Accepted
}

fn mirror_snapshot(platform: &MemoryChannelManager, snapshot: &GuildSnapshot) {
    for (position, channel) in snapshot.channels.iter().enumerate() {
        if platform.channel(&channel.id).is_none() {
            platform.add_channel(ChannelInfo {
                id: channel.id.clone(),
                name: channel.name.clone(),
                parent: channel.parent.clone(),
                position: position as i64,
            });
        }
    }
}
