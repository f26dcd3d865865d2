use thiserror::Error;

/// Top-level error type for the TradeWatch system.
///
/// Subsystem crates define their own error types and implement
/// `From<TradewatchError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TradewatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TradewatchError {
    fn from(err: toml::de::Error) -> Self {
        TradewatchError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TradewatchError {
    fn from(err: toml::ser::Error) -> Self {
        TradewatchError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TradewatchError {
    fn from(err: serde_json::Error) -> Self {
        TradewatchError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for TradeWatch operations.
pub type Result<T> = std::result::Result<T, TradewatchError>;
