use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TradewatchError};

/// Top-level configuration for the TradeWatch service.
///
/// Loaded from `~/.tradewatch/config.toml` by default. Each section
/// corresponds to one collaborator of the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradewatchConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl TradewatchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TradewatchConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TradewatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `TRADEWATCH_PORT`, `TRADEWATCH_DATA_DIR`,
    /// `OPENAI_API_KEY`, `SLACK_BOT_TOKEN`. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("TRADEWATCH_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.general.port = p,
                Err(_) => warn!(value = %port, "Ignoring invalid TRADEWATCH_PORT"),
            }
        }
        if let Some(dir) = get("TRADEWATCH_DATA_DIR") {
            self.general.data_dir = dir;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(token) = get("SLACK_BOT_TOKEN") {
            self.slack.bot_token = token;
        }
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port.
    pub port: u16,
    /// Address the HTTP server binds to.
    pub bind_address: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.tradewatch/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Text-generation service settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub model: String,
    /// Bearer token. Usually supplied through `OPENAI_API_KEY`.
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout; the summary falls back once it elapses.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key: String::new(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 30,
        }
    }
}

/// Chat-bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token for `chat.postMessage`. Empty means messages are only logged.
    pub bot_token: String,
    /// Handle shown in help and usage messages (without the `@`).
    pub bot_handle: String,
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            bot_handle: "gts-ws".to_string(),
            api_base: "https://slack.com/api".to_string(),
        }
    }
}

/// Bulk CSV import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Directory holding `tariffs.csv`, `shipping_routes.csv` and `market_data.csv`.
    pub data_dir: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}
