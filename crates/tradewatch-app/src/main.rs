//! TradeWatch application binary - composition root.
//!
//! 1. Load `.env`, CLI flags and the TOML configuration
//! 2. Initialize tracing
//! 3. Open the SQLite store
//! 4. Either import CSV data or wire the services and serve the API

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tradewatch_api::routes;
use tradewatch_api::state::AppState;
use tradewatch_chat::{LogSink, MessageSink, SlackSink};
use tradewatch_core::config::TradewatchConfig;
use tradewatch_insight::{OpenAiClient, TextGenerator};
use tradewatch_storage::{CsvImporter, Database};

use cli::{CliArgs, Command};

/// Expand a leading `~/` to the user's home directory.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn open_database(config: &TradewatchConfig) -> Result<Database, Box<dyn std::error::Error>> {
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("tradewatch.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    Ok(db)
}

fn build_sink(config: &TradewatchConfig) -> Arc<dyn MessageSink> {
    if config.slack.bot_token.is_empty() {
        tracing::info!("SLACK_BOT_TOKEN not set, chat replies will only be logged");
        Arc::new(LogSink)
    } else {
        Arc::new(SlackSink::new(&config.slack))
    }
}

async fn serve(config: TradewatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(&config)?;

    if config.llm.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY not set, executive summaries will use the fallback text");
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiClient::new(&config.llm));
    let sink = build_sink(&config);

    let state = AppState::new(config.clone(), db, generator, sink);

    tracing::info!(
        addr = %format!("{}:{}", config.general.bind_address, config.general.port),
        "API server listening"
    );
    routes::start_server(&config, state).await?;
    Ok(())
}

fn import(config: &TradewatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(open_database(config)?);
    let csv_dir = PathBuf::from(&config.import.data_dir);

    tracing::info!(dir = %csv_dir.display(), "Importing CSV data");
    let report = CsvImporter::new(db, csv_dir).run()?;
    tracing::info!(
        tariffs = report.tariffs,
        shipping_routes = report.shipping_routes,
        market_rows = report.market_rows,
        "Import finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();

    // Config, before tracing so its log level can seed the filter.
    let config_file = args.resolve_config_path();
    let loaded = TradewatchConfig::load(&config_file);
    let mut config = match &loaded {
        Ok(c) => c.clone(),
        Err(_) => TradewatchConfig::default(),
    };
    config.apply_env_overrides();
    args.apply_to(&mut config);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting TradeWatch v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), ".env loaded"),
        Err(e) => tracing::debug!(error = %e, ".env not loaded, using process environment"),
    }
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    match args.command() {
        Command::Serve { .. } => serve(config).await,
        Command::Import { .. } => import(&config),
    }
}
