//! Conversational bot session (Azure Bot Framework Direct Line).
//!
//! At startup the server opens a Direct Line conversation so the bot
//! can talk to viewers in chat. The overlay never reads this state; it
//! is kept here only so the process can log and reuse the conversation
//! id. All calls are time-bounded and failures are the caller's to log.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::AzureBotConfig;
use crate::error::ServerAppError;

/// Response body of `POST /conversations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationStarted {
    conversation_id: String,
}

/// A Direct Line client holding at most one open conversation.
#[derive(Debug)]
pub struct BotSession {
    client: reqwest::Client,
    directline_url: String,
    secret: String,
    timeout: Duration,
    conversation_id: RwLock<Option<String>>,
}

impl BotSession {
    /// Create a session client; no network traffic until
    /// [`BotSession::start_conversation`].
    pub fn new(config: &AzureBotConfig, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            directline_url: config.directline_url.trim_end_matches('/').to_owned(),
            secret: config.secret.clone(),
            timeout,
            conversation_id: RwLock::new(None),
        }
    }

    /// Open a conversation and remember its id.
    ///
    /// Returns the existing id without a network call if a conversation
    /// is already open. The configured timeout bounds the whole exchange,
    /// response body included.
    pub async fn start_conversation(&self) -> Result<String, ServerAppError> {
        if let Some(id) = self.conversation_id().await {
            return Ok(id);
        }

        let id = tokio::time::timeout(self.timeout, self.open_conversation())
            .await
            .map_err(|_elapsed| {
                ServerAppError::Integration(format!(
                    "Direct Line timed out after {:?}",
                    self.timeout
                ))
            })??;

        info!(conversation_id = id, "bot conversation started");
        *self.conversation_id.write().await = Some(id.clone());
        Ok(id)
    }

    async fn open_conversation(&self) -> Result<String, ServerAppError> {
        let url = format!("{}/conversations", self.directline_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.secret))
            .send()
            .await
            .map_err(|e| ServerAppError::Integration(format!("Direct Line request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(ServerAppError::Integration(format!(
                "Direct Line returned {status}: {error_body}"
            )));
        }

        let started: ConversationStarted = response.json().await.map_err(|e| {
            ServerAppError::Integration(format!("Direct Line response parse failed: {e}"))
        })?;
        Ok(started.conversation_id)
    }

    /// The id of the open conversation, if one was started.
    pub async fn conversation_id(&self) -> Option<String> {
        self.conversation_id.read().await.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    async fn spawn_directline(status: StatusCode) -> String {
        let app = Router::new().route(
            "/v3/directline/conversations",
            post(move |headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer s3cret");
                if authorized {
                    (status, Json(serde_json::json!({"conversationId": "conv-1"})))
                } else {
                    (StatusCode::FORBIDDEN, Json(serde_json::json!({})))
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v3/directline/")
    }

    fn session(url: String, secret: &str) -> BotSession {
        let config = AzureBotConfig {
            secret: secret.to_owned(),
            directline_url: url,
        };
        BotSession::new(&config, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn start_conversation_records_id() {
        let bot = session(spawn_directline(StatusCode::CREATED).await, "s3cret");
        assert_eq!(bot.conversation_id().await, None);

        let id = bot.start_conversation().await.unwrap();
        assert_eq!(id, "conv-1");
        assert_eq!(bot.conversation_id().await.as_deref(), Some("conv-1"));
    }

    #[tokio::test]
    async fn second_start_reuses_open_conversation() {
        let bot = session(spawn_directline(StatusCode::CREATED).await, "s3cret");
        bot.start_conversation().await.unwrap();

        // Point at nothing; a network call would now fail.
        let reused = BotSession {
            directline_url: "http://127.0.0.1:1".to_owned(),
            ..bot
        };
        assert_eq!(reused.start_conversation().await.unwrap(), "conv-1");
    }

    #[tokio::test]
    async fn conversation_started_in_background_is_kept_by_shared_session() {
        let bot = Arc::new(session(
            spawn_directline(StatusCode::CREATED).await,
            "s3cret",
        ));

        let background = Arc::clone(&bot);
        tokio::spawn(async move { background.start_conversation().await })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bot.conversation_id().await.as_deref(), Some("conv-1"));
        assert_eq!(bot.start_conversation().await.unwrap(), "conv-1");
    }

    #[tokio::test]
    async fn rejected_secret_is_an_integration_error() {
        let bot = session(spawn_directline(StatusCode::CREATED).await, "wrong");
        let err = bot.start_conversation().await.unwrap_err();
        assert!(matches!(err, ServerAppError::Integration(_)));
        assert_eq!(bot.conversation_id().await, None);
    }

    #[tokio::test]
    async fn stalled_response_body_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _read = stream.read(&mut buf).await;
            let _written = stream
                .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 100\r\n\r\n{\"conv")
                .await;
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(stream);
        });

        let config = AzureBotConfig {
            secret: "s3cret".to_owned(),
            directline_url: format!("http://{addr}"),
        };
        let bot = BotSession::new(&config, Duration::from_millis(200));

        let started = Instant::now();
        let err = bot.start_conversation().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(bot.conversation_id().await, None);
    }
}
