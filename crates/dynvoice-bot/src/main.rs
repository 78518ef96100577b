//! dynvoice binary
//!
//! Keeps configured guilds' voice channels sized to their occupancy.

use dynvoice_bot::{BotConfig, BotNode};
use dynvoice_core::LogLevel;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BotConfig::from_env()?;
    let level = config.log_level();

    // RUST_LOG wins over the configured level
    let directive = level.clone().unwrap_or_default().directive();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "error,dynvoice={0},dynvoice_bot={0},dynvoice_core={0},dynvoice_ledger={0}",
                    directive
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = level {
        tracing::warn!("{}, using {:?}", e, LogLevel::default());
    }

    let guilds = config.guilds();
    let node = BotNode::new(config, guilds)?;
    node.run().await?;

    Ok(())
}
