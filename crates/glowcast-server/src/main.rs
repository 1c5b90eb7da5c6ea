//! Glowcast server entry point.
//!
//! Wires the overlay together and runs it. The overlay crate owns the
//! light state and the HTTP surface; this binary only does bootstrap:
//! logging, configuration, integrations, and the listener.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from environment variables
//! 2. Initialize structured logging (tracing) in the configured format
//! 3. Build the change notifier (chat webhook, if enabled)
//! 4. Create the application state (light starts blue)
//! 5. Open the bot conversation on a background task (if enabled); the
//!    session lives until shutdown
//! 6. Serve HTTP + `WebSocket` until `Ctrl-C`

mod bot;
mod config;
mod error;

use std::sync::Arc;

use glowcast_overlay::{start_server, AppState, DiscordWebhook, Notifier};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::bot::BotSession;
use crate::config::{AppConfig, LogFormat};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind or serve.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration decides the log format, so read it before logging
    // is up and report problems afterwards.
    let config = AppConfig::from_env();
    let log_format = config
        .as_ref()
        .map_or(LogFormat::Text, |config| config.log_format);
    init_logging(log_format);

    info!("glowcast-server starting");
    let config = config?;
    info!(
        host = config.server.host,
        port = config.server.port,
        static_dir = ?config.server.static_dir,
        discord_hook = config.discord.is_some(),
        azure_bot = config.azure_bot.is_some(),
        integration_timeout_ms = config.integration_timeout.as_millis(),
        "configuration loaded"
    );

    let notifier = config.discord.as_ref().map_or(Notifier::Disabled, |discord| {
        Notifier::Discord(DiscordWebhook::new(
            discord.webhook_url.clone(),
            discord.username.clone(),
            config.integration_timeout,
        ))
    });
    info!(notifier = notifier.name(), "change notifier configured");

    let state = Arc::new(AppState::with_notifier(notifier));

    let bot = config.azure_bot.as_ref().map(|bot_config| {
        Arc::new(BotSession::new(bot_config, config.integration_timeout))
    });
    if let Some(session) = &bot {
        let session = Arc::clone(session);
        tokio::spawn(async move {
            if let Err(e) = session.start_conversation().await {
                warn!(error = %e, "bot session unavailable, continuing without it");
            }
        });
    }

    start_server(&config.server, state).await?;

    if let Some(session) = &bot {
        let conversation_id = session.conversation_id().await;
        info!(?conversation_id, "bot session closed");
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering and defaults to `info`.
fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
