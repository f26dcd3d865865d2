//! Outbound message delivery.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tradewatch_core::config::SlackConfig;

use crate::error::ChatError;

/// Destination for bot replies.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}

/// Sink that only logs. Used when no bot token is configured.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn send(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        debug!(channel, chars = text.len(), "No Slack token configured, message not posted");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts replies through the Slack Web API `chat.postMessage` method.
pub struct SlackSink {
    http: Client,
    endpoint: String,
    token: String,
}

impl SlackSink {
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/chat.postMessage", config.api_base.trim_end_matches('/')),
            token: config.bot_token.clone(),
        }
    }
}

#[async_trait]
impl MessageSink for SlackSink {
    async fn send(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&PostMessage { channel, text })
            .send()
            .await
            .map_err(|e| ChatError::Sink(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Sink(format!("Slack returned {}", status)));
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Sink(format!("malformed response: {}", e)))?;

        if body.ok {
            Ok(())
        } else {
            Err(ChatError::Sink(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// A message captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: String,
    pub text: String,
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<SentMessage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.messages
            .lock()
            .map_err(|e| ChatError::Sink(format!("recording sink poisoned: {}", e)))?
            .push(SentMessage {
                channel: channel.to_string(),
                text: text.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn slack_config(api_base: &str) -> SlackConfig {
        SlackConfig {
            api_base: api_base.to_string(),
            bot_token: "xoxb-test".to_string(),
            ..SlackConfig::default()
        }
    }

    #[tokio::test]
    async fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.send("C1", "first").await.unwrap();
        sink.send("C2", "second").await.unwrap();

        let sent = sink.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].channel, "C1");
        assert_eq!(sent[1].text, "second");
    }

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        assert!(LogSink.send("C1", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_slack_sink_posts_message() {
        let app = Router::new().route(
            "/chat.postMessage",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer xoxb-test");
                let ok = authorized && body["channel"] == "C42" && body["text"] == "hi";
                Json(json!({ "ok": ok, "error": "unexpected_request" }))
            }),
        );
        let base = spawn(app).await;

        SlackSink::new(&slack_config(&base))
            .send("C42", "hi")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_slack_sink_reports_api_error() {
        let app = Router::new().route(
            "/chat.postMessage",
            post(|| async { Json(json!({ "ok": false, "error": "channel_not_found" })) }),
        );
        let base = spawn(app).await;

        let err = SlackSink::new(&slack_config(&base))
            .send("C404", "hi")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "sink error: channel_not_found");
    }

    #[tokio::test]
    async fn test_slack_sink_rejects_empty_text() {
        let err = SlackSink::new(&slack_config("http://127.0.0.1:9"))
            .send("C1", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }
}
