//! Error types for the chat command interface.

use tradewatch_insight::InsightError;

/// Errors from the chat command interface.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("insight error: {0}")]
    Insight(#[from] InsightError),
    #[error("sink error: {0}")]
    Sink(String),
}
