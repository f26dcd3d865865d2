use thiserror::Error;

use tradewatch_core::error::TradewatchError;

/// Errors that can occur while building summaries and briefings.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("config error: {0}")]
    Config(String),
}

impl From<TradewatchError> for InsightError {
    fn from(err: TradewatchError) -> Self {
        match err {
            TradewatchError::Config(msg) => InsightError::Config(msg),
            other => InsightError::Storage(other.to_string()),
        }
    }
}
