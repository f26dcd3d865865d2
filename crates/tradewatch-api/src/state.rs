//! Application state shared across all route handlers.
//!
//! AppState holds the store, the read services built on it and the chat
//! interpreter. It is passed to handlers via axum's State extractor.

use std::sync::Arc;

use tradewatch_chat::{CommandInterpreter, MessageSink};
use tradewatch_core::config::TradewatchConfig;
use tradewatch_insight::{GenerationOptions, SummaryBuilder, TextGenerator, TradeBriefing};
use tradewatch_storage::{
    Database, MarketRepository, MetricsService, ShippingRepository, TariffRepository,
};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub metrics: Arc<MetricsService>,
    pub tariffs: Arc<TariffRepository>,
    pub shipping: Arc<ShippingRepository>,
    pub markets: Arc<MarketRepository>,
    pub summary: Arc<SummaryBuilder>,
    /// Chat-bot command handling for the webhook.
    pub interpreter: Arc<CommandInterpreter>,
}

impl AppState {
    /// Wire every service onto one database.
    ///
    /// `config` supplies the generation options and the bot handle.
    pub fn new(
        config: TradewatchConfig,
        database: Database,
        generator: Arc<dyn TextGenerator>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        let database = Arc::new(database);

        let summary = Arc::new(
            SummaryBuilder::new(Arc::clone(&database), generator)
                .with_options(GenerationOptions::from(&config.llm)),
        );
        let briefing = Arc::new(TradeBriefing::new(Arc::clone(&database)));
        let interpreter = CommandInterpreter::new(Arc::clone(&summary), briefing, sink)
            .with_bot_handle(config.slack.bot_handle.clone());

        Self {
            metrics: Arc::new(MetricsService::new(Arc::clone(&database))),
            tariffs: Arc::new(TariffRepository::new(Arc::clone(&database))),
            shipping: Arc::new(ShippingRepository::new(Arc::clone(&database))),
            markets: Arc::new(MarketRepository::new(Arc::clone(&database))),
            summary,
            interpreter: Arc::new(interpreter),
            database,
        }
    }
}
