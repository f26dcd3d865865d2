pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::TradewatchConfig;
pub use error::{Result, TradewatchError};
pub use types::*;
