//! Configuration types for the server binary.
//!
//! All configuration is loaded from environment variables. The server
//! needs to know where to listen, whether to serve a static overlay
//! directory, and which integrations are switched on (with their
//! credentials).

use std::path::PathBuf;
use std::time::Duration;

use glowcast_overlay::ServerConfig;

use crate::error::ServerAppError;

/// Default Azure Bot Framework Direct Line endpoint.
pub const DEFAULT_DIRECTLINE_URL: &str = "https://directline.botframework.com/v3/directline";

/// Complete process configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listener and static directory settings.
    pub server: ServerConfig,
    /// Chat webhook for change notifications, when enabled.
    pub discord: Option<DiscordConfig>,
    /// Conversational bot session, when enabled.
    pub azure_bot: Option<AzureBotConfig>,
    /// Upper bound for any single outbound integration call.
    pub integration_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

/// Settings for the change-notification webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,
    /// Name the posts appear under.
    pub username: String,
}

/// Settings for the Direct Line bot session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureBotConfig {
    /// Direct Line secret.
    pub secret: String,
    /// Direct Line base URL.
    pub directline_url: String,
}

/// Supported log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables (defaults in parentheses):
    /// - `GLOWCAST_HOST` -- bind host (`0.0.0.0`)
    /// - `PORT` -- listen port (`3000`)
    /// - `STATIC_DIR` -- directory served for unmatched paths (unset)
    /// - `DISCORD_HOOK_ENABLED` -- enable change notifications (`false`)
    /// - `DISCORD_WEBHOOK_URL` -- webhook URL, required when enabled
    /// - `DISCORD_HOOK_USERNAME` -- post author name (`Glowcast`)
    /// - `AZURE_BOT_ENABLED` -- enable the bot session (`false`)
    /// - `AZURE_BOT_SECRET` -- Direct Line secret, required when enabled
    /// - `AZURE_BOT_DIRECTLINE_URL` -- Direct Line base URL
    /// - `INTEGRATION_TIMEOUT_MS` -- outbound call bound (`5000`)
    /// - `LOG_FORMAT` -- `text` or `json` (`text`)
    pub fn from_env() -> Result<Self, ServerAppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// [`AppConfig::from_env`] passes the process environment; tests
    /// pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerAppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("GLOWCAST_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let static_dir = lookup("STATIC_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let discord = if parse_or(&lookup, "DISCORD_HOOK_ENABLED", false)? {
            Some(DiscordConfig {
                webhook_url: required(&lookup, "DISCORD_WEBHOOK_URL")?,
                username: lookup("DISCORD_HOOK_USERNAME")
                    .unwrap_or_else(|| "Glowcast".to_owned()),
            })
        } else {
            None
        };

        let azure_bot = if parse_or(&lookup, "AZURE_BOT_ENABLED", false)? {
            Some(AzureBotConfig {
                secret: required(&lookup, "AZURE_BOT_SECRET")?,
                directline_url: lookup("AZURE_BOT_DIRECTLINE_URL")
                    .unwrap_or_else(|| DEFAULT_DIRECTLINE_URL.to_owned()),
            })
        } else {
            None
        };

        let integration_timeout_ms: u64 = parse_or(&lookup, "INTEGRATION_TIMEOUT_MS", 5000)?;

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_else(|| "text".to_owned())
            .to_lowercase()
            .as_str()
        {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ServerAppError::Config(format!(
                    "invalid LOG_FORMAT: {other}"
                )))
            }
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                static_dir,
            },
            discord,
            azure_bot,
            integration_timeout: Duration::from_millis(integration_timeout_ms),
            log_format,
        })
    }
}

/// Read a required variable, rejecting blank values.
fn required<F>(lookup: &F, name: &str) -> Result<String, ServerAppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ServerAppError::Config(format!("missing required env var {name}")))
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ServerAppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServerAppError::Config(format!("invalid {name}: {e}"))),
    }
}
