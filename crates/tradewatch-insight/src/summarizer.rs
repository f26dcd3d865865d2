//! Executive summary generation.
//!
//! Reads the headline counts, the highest tariffs and the disrupted routes,
//! renders them into an analyst prompt and asks the text generator for a
//! short narrative. When generation fails for any reason the builder
//! returns a templated summary built from the counts alone.

use std::fmt::Write;
use std::sync::Arc;

use tracing::{info, warn};

use tradewatch_core::text::format_number;
use tradewatch_core::types::{RouteStatus, ShippingRoute, TariffRecord, HIGH_TARIFF_THRESHOLD};
use tradewatch_storage::{Database, MetricsService, ShippingRepository, SummaryCounts, TariffRepository};

use crate::error::InsightError;
use crate::llm::{GenerationOptions, TextGenerator};

/// Number of tariffs listed in the prompt.
const TOP_TARIFF_COUNT: u64 = 3;

/// Store data a summary is built from.
#[derive(Debug, Clone)]
pub struct SummaryInputs {
    pub counts: SummaryCounts,
    /// Highest tariff rates first.
    pub top_tariffs: Vec<TariffRecord>,
    pub disrupted_routes: Vec<ShippingRoute>,
}

/// Builds the AI executive summary.
pub struct SummaryBuilder {
    metrics: MetricsService,
    tariffs: TariffRepository,
    routes: ShippingRepository,
    generator: Arc<dyn TextGenerator>,
    options: GenerationOptions,
}

impl SummaryBuilder {
    pub fn new(db: Arc<Database>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            metrics: MetricsService::new(Arc::clone(&db)),
            tariffs: TariffRepository::new(Arc::clone(&db)),
            routes: ShippingRepository::new(db),
            generator,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Read everything the prompt needs from the store.
    pub fn gather(&self) -> Result<SummaryInputs, InsightError> {
        Ok(SummaryInputs {
            counts: self.metrics.summary_counts()?,
            top_tariffs: self.tariffs.top_by_rate(TOP_TARIFF_COUNT)?,
            disrupted_routes: self.routes.find_by_status(RouteStatus::Disrupted)?,
        })
    }

    /// Generate the executive summary.
    ///
    /// Store failures are returned as errors. Generation failures are
    /// logged and answered with [`fallback_summary`].
    pub async fn generate_executive_summary(&self) -> Result<String, InsightError> {
        let inputs = self.gather()?;
        let prompt = build_prompt(&inputs);

        match self.generator.generate(&prompt, &self.options).await {
            Ok(text) => {
                info!(chars = text.len(), "Executive summary generated");
                Ok(text)
            }
            Err(e) => {
                warn!(error = %e, "Summary generation failed, using fallback");
                Ok(fallback_summary(&inputs.counts))
            }
        }
    }
}

/// Render the analyst prompt.
pub fn build_prompt(inputs: &SummaryInputs) -> String {
    let counts = &inputs.counts;
    let mut prompt = String::new();

    prompt.push_str(
        "You are a Bloomberg-style trade analyst. Write a 3-paragraph executive summary \
         on the current global trade situation:\n\n",
    );
    prompt.push_str("CURRENT DATA:\n");
    let _ = writeln!(
        prompt,
        "- {} country pairs have tariffs ≥{}%",
        counts.high_tariffs, HIGH_TARIFF_THRESHOLD
    );
    let _ = writeln!(prompt, "- {} major shipping routes disrupted", counts.disrupted_routes);
    let _ = writeln!(prompt, "- {} market sectors showing decline", counts.declining_records);

    prompt.push_str("\nTOP TARIFFS:\n");
    for tariff in &inputs.top_tariffs {
        let _ = writeln!(prompt, "- {}", tariff);
    }

    prompt.push_str("\nDISRUPTED ROUTES:\n");
    if inputs.disrupted_routes.is_empty() {
        prompt.push_str("None currently\n");
    } else {
        for route in &inputs.disrupted_routes {
            let _ = writeln!(
                prompt,
                "- {}: Cost Index {}",
                route.route_name,
                format_number(route.freight_cost_index)
            );
        }
    }

    prompt.push_str(
        "\nANALYSIS FOCUS:\n\
         1. What's the immediate situation?\n\
         2. Market impact (potential losses/gains)\n\
         3. Top 3 risks for businesses\n\n\
         Keep it under 150 words. Be specific with numbers. Sound professional but accessible.",
    );
    prompt
}

/// Deterministic summary used when text generation is unavailable.
pub fn fallback_summary(counts: &SummaryCounts) -> String {
    format!(
        "📊 GLOBAL TRADE SITUATION SUMMARY\n\n\
         Key Metrics:\n\
         • {} high-tariff country pairs (≥{}%)\n\
         • {} shipping routes disrupted\n\
         • {} declining market sectors\n\n\
         Current Status:\n\
         The global trade environment is experiencing elevated stress from tariff escalations \
         and logistical disruptions. Major routes like Panama Canal remain congested, increasing \
         freight costs 40-50% above baseline. Market sectors exposed to tariffs showing pressure, \
         particularly tech and automotive.\n\n\
         Risks:\n\
         1. Further tariff escalations could trigger $1T+ in supply chain costs\n\
         2. Shipping congestion creating inventory delays (3-4 weeks typical)\n\
         3. Market volatility likely to continue through Q1 2026",
        counts.high_tariffs, HIGH_TARIFF_THRESHOLD, counts.disrupted_routes, counts.declining_records
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tradewatch_core::types::MarketRecord;
    use tradewatch_storage::MarketRepository;

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &GenerationOptions) -> Result<String, InsightError> {
            Err(InsightError::Generation("connection refused".to_string()))
        }
    }

    /// Returns a fixed reply and remembers the prompts it was given.
    struct CannedGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str, _: &GenerationOptions) -> Result<String, InsightError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn seed(db: &Arc<Database>) {
        let tariffs = TariffRepository::new(Arc::clone(db));
        for (to, sector, rate) in [
            ("USA", "Technology", 25.0),
            ("USA", "Steel", 45.0),
            ("EU", "Solar", 60.0),
            ("USA", "Textiles", 12.5),
        ] {
            tariffs
                .save(&TariffRecord {
                    country_from: "China".into(),
                    country_to: to.into(),
                    sector: sector.into(),
                    tariff_rate: rate,
                    effective_date: date(),
                })
                .unwrap();
        }

        let routes = ShippingRepository::new(Arc::clone(db));
        routes.save("Panama Canal", RouteStatus::Disrupted, 145.0).unwrap();
        routes.save("Suez Canal", RouteStatus::Normal, 100.0).unwrap();

        let markets = MarketRepository::new(Arc::clone(db));
        for (symbol, sector, change) in [("XLK", "Technology", -2.0), ("AAPL", "Technology", -1.0)] {
            markets
                .save(&MarketRecord {
                    symbol: symbol.into(),
                    sector: sector.into(),
                    price_change_7d: change,
                    date: date(),
                })
                .unwrap();
        }
    }

    fn seeded_db() -> Arc<Database> {
        let db = Arc::new(Database::in_memory().unwrap());
        seed(&db);
        db
    }

    #[test]
    fn test_gather_reads_counts_and_top_tariffs() {
        let builder = SummaryBuilder::new(seeded_db(), Arc::new(FailingGenerator));
        let inputs = builder.gather().unwrap();

        assert_eq!(inputs.counts.high_tariffs, 3);
        assert_eq!(inputs.counts.disrupted_routes, 1);
        // Raw row count, both rows share a sector.
        assert_eq!(inputs.counts.declining_records, 2);

        let rates: Vec<f64> = inputs.top_tariffs.iter().map(|t| t.tariff_rate).collect();
        assert_eq!(rates, vec![60.0, 45.0, 25.0]);
        assert_eq!(inputs.disrupted_routes.len(), 1);
    }

    #[test]
    fn test_prompt_lists_items() {
        let builder = SummaryBuilder::new(seeded_db(), Arc::new(FailingGenerator));
        let prompt = build_prompt(&builder.gather().unwrap());

        assert!(prompt.contains("- 3 country pairs have tariffs ≥20%"));
        assert!(prompt.contains("- China → EU: 60.0% (Solar)"));
        assert!(prompt.contains("- Panama Canal: Cost Index 145.0"));
        assert!(!prompt.contains("Textiles"));
        assert!(!prompt.contains("None currently"));
    }

    #[test]
    fn test_prompt_without_disruptions() {
        let inputs = SummaryInputs {
            counts: SummaryCounts {
                high_tariffs: 0,
                disrupted_routes: 0,
                declining_records: 0,
            },
            top_tariffs: Vec::new(),
            disrupted_routes: Vec::new(),
        };
        assert!(build_prompt(&inputs).contains("DISRUPTED ROUTES:\nNone currently\n"));
    }

    #[tokio::test]
    async fn test_summary_uses_generator_text() {
        let generator = Arc::new(CannedGenerator::new("Markets are tense."));
        let builder = SummaryBuilder::new(seeded_db(), generator.clone());

        let summary = builder.generate_executive_summary().await.unwrap();
        assert_eq!(summary, "Markets are tense.");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("TOP TARIFFS"));
    }

    #[tokio::test]
    async fn test_summary_falls_back_on_failure() {
        let builder = SummaryBuilder::new(seeded_db(), Arc::new(FailingGenerator));

        let first = builder.generate_executive_summary().await.unwrap();
        let second = builder.generate_executive_summary().await.unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("📊 GLOBAL TRADE SITUATION SUMMARY"));
        assert!(first.contains("• 3 high-tariff country pairs (≥20%)"));
        assert!(first.contains("• 1 shipping routes disrupted"));
        assert!(first.contains("• 2 declining market sectors"));
    }

    #[tokio::test]
    async fn test_fallback_on_empty_store() {
        let db = Arc::new(Database::in_memory().unwrap());
        let builder = SummaryBuilder::new(db, Arc::new(FailingGenerator));

        let summary = builder.generate_executive_summary().await.unwrap();
        assert!(summary.contains("• 0 high-tariff country pairs"));
    }

    #[tokio::test]
    async fn test_store_failure_is_error() {
        let db = seeded_db();
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE tariffs")
                .map_err(|e| tradewatch_core::TradewatchError::Storage(e.to_string()))
        })
        .unwrap();

        let builder = SummaryBuilder::new(db, Arc::new(FailingGenerator));
        let err = builder.generate_executive_summary().await.unwrap_err();
        assert!(matches!(err, InsightError::Storage(_)));
    }
}
