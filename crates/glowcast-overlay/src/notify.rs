//! Outbound change notifications.
//!
//! After a mutation commits, the overlay tells an external chat channel
//! about it. Delivery runs on a detached Tokio task bounded by a
//! timeout; the outcome is logged and otherwise discarded, so a slow or
//! unreachable webhook never delays or fails the trigger request.
//!
//! Uses enum dispatch rather than a trait object because the send path
//! is async.

use std::time::Duration;

use glowcast_types::LightState;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Errors from a single webhook delivery. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// The HTTP request could not be sent or completed.
    #[error("webhook request failed: {0}")]
    Request(String),

    /// The webhook answered with a non-success status.
    #[error("webhook returned {status}: {body}")]
    Status {
        /// HTTP status code returned.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The webhook did not answer within the configured bound.
    #[error("webhook timed out after {0:?}")]
    Timeout(Duration),
}

/// Where change notifications go.
#[derive(Debug, Clone, Default)]
pub enum Notifier {
    /// Notifications are switched off.
    #[default]
    Disabled,
    /// Post to a Discord-compatible webhook.
    Discord(DiscordWebhook),
}

impl Notifier {
    /// Announce `state` without waiting for the result.
    ///
    /// Returns the handle of the detached delivery task, or `None` when
    /// notifications are disabled. Callers on the mutation path drop the
    /// handle.
    pub fn notify(&self, state: LightState) -> Option<JoinHandle<()>> {
        match self {
            Self::Disabled => None,
            Self::Discord(hook) => {
                let hook = hook.clone();
                let content = describe(state);
                Some(tokio::spawn(async move {
                    match hook.send(&content).await {
                        Ok(()) => debug!(%state, "change notification delivered"),
                        Err(e) => warn!(%state, error = %e, "change notification failed"),
                    }
                }))
            }
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Disabled => "disabled",
            Self::Discord(_) => "discord-webhook",
        }
    }
}

/// A Discord-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
    username: String,
    timeout: Duration,
}

impl DiscordWebhook {
    /// Create a webhook client posting to `url` as `username`.
    pub fn new(url: impl Into<String>, username: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            username: username.into(),
            timeout,
        }
    }

    /// Post `content` to the webhook, bounded by the configured timeout.
    ///
    /// The bound covers the whole exchange, including reading an error
    /// body, so a receiver that stalls mid-response still ends in
    /// [`IntegrationError::Timeout`].
    pub async fn send(&self, content: &str) -> Result<(), IntegrationError> {
        match tokio::time::timeout(self.timeout, self.send_inner(content)).await {
            Ok(result) => result,
            Err(_) => Err(IntegrationError::Timeout(self.timeout)),
        }
    }

    async fn send_inner(&self, content: &str) -> Result<(), IntegrationError> {
        let body = serde_json::json!({
            "content": content,
            "username": self.username,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntegrationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// The chat message announcing a new light state.
pub fn describe(state: LightState) -> String {
    match state {
        LightState::Color(color) => format!("Lights changed to **{color}**"),
        LightState::Effect(effect) => format!("Lights are now running the **{effect}** effect"),
    }
}
