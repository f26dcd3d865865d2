//! CLI argument definitions for the TradeWatch application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tradewatch_core::config::TradewatchConfig;

/// TradeWatch - trade intelligence dashboard backend and chat bot.
#[derive(Parser, Debug)]
#[command(name = "tradewatch", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP API server (default).
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,

        /// Address to bind, e.g. 0.0.0.0.
        #[arg(long = "bind")]
        bind: Option<String>,
    },
    /// Replace all stored data with the CSV files in a directory.
    Import {
        /// Directory containing tariffs.csv, shipping_routes.csv and market_data.csv.
        #[arg(long = "csv-dir")]
        csv_dir: Option<PathBuf>,
    },
}

impl CliArgs {
    /// The subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            port: None,
            bind: None,
        })
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TRADEWATCH_CONFIG env var > ~/.tradewatch/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TRADEWATCH_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Write flag values over `config`. Call after env overrides so flags win.
    pub fn apply_to(&self, config: &mut TradewatchConfig) {
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        match self.command() {
            Command::Serve { port, bind } => {
                if let Some(p) = port {
                    config.general.port = p;
                }
                if let Some(b) = bind {
                    config.general.bind_address = b;
                }
            }
            Command::Import { csv_dir } => {
                if let Some(dir) = csv_dir {
                    config.import.data_dir = dir.to_string_lossy().to_string();
                }
            }
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".tradewatch").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".tradewatch").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_to_serve() {
        let cli = parse(&["tradewatch"]);
        assert_eq!(cli.command(), Command::Serve { port: None, bind: None });
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = parse(&["tradewatch", "serve", "--port", "9100", "--bind", "0.0.0.0", "-l", "debug"]);
        let mut config = TradewatchConfig::default();
        config.general.port = 8080;

        cli.apply_to(&mut config);
        assert_eq!(config.general.port, 9100);
        assert_eq!(config.general.bind_address, "0.0.0.0");
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_import_csv_dir() {
        let cli = parse(&["tradewatch", "import", "--csv-dir", "/srv/demo", "--data-dir", "/var/tw"]);
        let mut config = TradewatchConfig::default();

        cli.apply_to(&mut config);
        assert_eq!(config.import.data_dir, "/srv/demo");
        assert_eq!(config.general.data_dir, "/var/tw");
        assert_eq!(config.general.port, 8000);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = parse(&["tradewatch", "serve"]);
        let mut config = TradewatchConfig::default();
        config.general.port = 7000;

        cli.apply_to(&mut config);
        assert_eq!(config.general.port, 7000);
    }

    #[test]
    fn test_explicit_config_path() {
        let cli = parse(&["tradewatch", "--config", "/etc/tradewatch.toml"]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/etc/tradewatch.toml"));
    }
}
