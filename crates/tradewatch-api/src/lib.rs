//! TradeWatch API crate - axum HTTP server, dashboard handlers, Slack webhook.
//!
//! Serves the read-only dashboard endpoints under `/api/` and the chat-bot
//! event gateway under `/slack/events/`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod slack;
pub mod state;

pub use error::{ApiError, StatusError};
pub use routes::{create_router, start_server};
pub use state::AppState;
