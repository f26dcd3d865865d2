//! Slack Events API webhook.
//!
//! Answers the URL-verification handshake, forwards `app_mention` events to
//! the command interpreter and acknowledges everything else with
//! `{"ok": true}`. A body that is not JSON gets a 400.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use tradewatch_chat::MentionEvent;

use crate::state::AppState;

const APP_MENTION: &str = "app_mention";

/// Envelope types the gateway understands.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification {
        #[serde(default)]
        challenge: Value,
    },
    EventCallback {
        #[serde(default)]
        event: Value,
    },
    #[serde(other)]
    Other,
}

/// POST /slack/events/ - Slack event webhook.
pub async fn slack_events(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Rejecting webhook with invalid JSON");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid JSON" })))
                .into_response();
        }
    };

    let envelope = serde_json::from_value(payload).unwrap_or(Envelope::Other);
    match envelope {
        Envelope::UrlVerification { challenge } => {
            debug!("Answering URL verification");
            return Json(json!({ "challenge": challenge })).into_response();
        }
        Envelope::EventCallback { event } => {
            if event.get("type").and_then(Value::as_str) == Some(APP_MENTION) {
                dispatch_mention(&state, event).await;
            }
        }
        Envelope::Other => {}
    }

    Json(json!({ "ok": true })).into_response()
}

async fn dispatch_mention(state: &AppState, event: Value) {
    let mention: MentionEvent = match serde_json::from_value(event) {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed app_mention event");
            return;
        }
    };

    if let Err(e) = state.interpreter.handle_mention(&mention).await {
        error!(error = %e, channel = %mention.channel, "Failed to deliver chat reply");
    }
}
