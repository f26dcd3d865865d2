//! Command interpreter for bot mentions.
//!
//! Every mention produces exactly one outbound message: the command's
//! reply, a usage hint, a pointer to `help`, or an apology when the store
//! could not be read.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use tradewatch_insight::{InsightError, SummaryBuilder, TradeBriefing};

use crate::error::ChatError;
use crate::parser::{Command, CommandParser};
use crate::sink::MessageSink;

/// Characters of each outbound message included in the log line.
const LOG_PREVIEW_CHARS: usize = 100;

/// An `app_mention` event as delivered by the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MentionEvent {
    pub text: String,
    pub channel: String,
    pub user: Option<String>,
}

/// Turns mentions into replies and hands them to a [`MessageSink`].
pub struct CommandInterpreter {
    parser: CommandParser,
    summary: Arc<SummaryBuilder>,
    briefing: Arc<TradeBriefing>,
    sink: Arc<dyn MessageSink>,
    bot_handle: String,
}

impl CommandInterpreter {
    pub fn new(
        summary: Arc<SummaryBuilder>,
        briefing: Arc<TradeBriefing>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            parser: CommandParser::new(),
            summary,
            briefing,
            sink,
            bot_handle: "gts-ws".to_string(),
        }
    }

    /// Handle shown in help and usage text.
    pub fn with_bot_handle(mut self, handle: impl Into<String>) -> Self {
        self.bot_handle = handle.into();
        self
    }

    /// Answer one mention.
    pub async fn handle_mention(&self, event: &MentionEvent) -> Result<(), ChatError> {
        let command = self.parser.parse(&event.text);
        info!(
            channel = %event.channel,
            user = event.user.as_deref().unwrap_or("-"),
            command = ?command,
            "Handling mention"
        );

        let reply = match self.reply_for(&command).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, command = ?command, "Command failed");
                format!("⚠️ Sorry, I couldn't read the trade data right now ({})", e)
            }
        };

        let preview: String = reply.chars().take(LOG_PREVIEW_CHARS).collect();
        info!(channel = %event.channel, preview = %preview, "Sending chat message");
        self.sink.send(&event.channel, &reply).await
    }

    /// Build the reply text for a parsed command.
    pub async fn reply_for(&self, command: &Command) -> Result<String, InsightError> {
        match command {
            Command::Summarize => {
                let summary = self.summary.generate_executive_summary().await?;
                Ok(format!("📊 **AI Executive Summary**\n\n{}", summary))
            }
            Command::TariffImpact {
                country: Some(country),
            } => self.briefing.tariff_impact(country),
            Command::TariffImpact { country: None } => Ok(format!(
                "⚠️ Please specify a country: `@{} tariff impact china`",
                self.bot_handle
            )),
            Command::ShippingRisk => self.briefing.shipping_risks(),
            Command::Help => Ok(self.help_text()),
            Command::Unknown => Ok(format!(
                "Try: `@{} help` for available commands",
                self.bot_handle
            )),
        }
    }

    fn help_text(&self) -> String {
        let h = &self.bot_handle;
        format!(
            "🤖 **{upper} Commands**\n\n\
             • `@{h} summarize` - AI executive summary\n\
             • `@{h} tariff impact [country]` - Tariff details (e.g., china, mexico)\n\
             • `@{h} shipping risk` - Current disruptions\n\
             • `@{h} help` - This message",
            upper = h.to_uppercase(),
            h = h
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tradewatch_core::types::{RouteStatus, TariffRecord};
    use tradewatch_insight::{GenerationOptions, TextGenerator};
    use tradewatch_storage::{Database, ShippingRepository, TariffRepository};

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &GenerationOptions) -> Result<String, InsightError> {
            Err(InsightError::Generation("offline".to_string()))
        }
    }

    struct Fixture {
        db: Arc<Database>,
        sink: Arc<RecordingSink>,
        interpreter: CommandInterpreter,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::in_memory().unwrap());
        TariffRepository::new(Arc::clone(&db))
            .save(&TariffRecord {
                country_from: "China".into(),
                country_to: "USA".into(),
                sector: "steel".into(),
                tariff_rate: 45.0,
                effective_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            })
            .unwrap();
        ShippingRepository::new(Arc::clone(&db))
            .save("Panama Canal", RouteStatus::Disrupted, 145.0)
            .unwrap();

        let sink = Arc::new(RecordingSink::new());
        let interpreter = CommandInterpreter::new(
            Arc::new(SummaryBuilder::new(Arc::clone(&db), Arc::new(FailingGenerator))),
            Arc::new(TradeBriefing::new(Arc::clone(&db))),
            sink.clone(),
        );
        Fixture {
            db,
            sink,
            interpreter,
        }
    }

    fn mention(text: &str) -> MentionEvent {
        MentionEvent {
            text: text.to_string(),
            channel: "C100".to_string(),
            user: Some("U7".to_string()),
        }
    }

    #[tokio::test]
    async fn test_tariff_impact_reply() {
        let f = fixture();
        f.interpreter
            .handle_mention(&mention("@bot tariff impact china"))
            .await
            .unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel, "C100");
        assert_eq!(
            sent[0].text,
            TradeBriefing::new(Arc::clone(&f.db)).tariff_impact("china").unwrap()
        );
    }

    #[tokio::test]
    async fn test_tariff_impact_missing_country() {
        let f = fixture();
        f.interpreter
            .handle_mention(&mention("@bot tariff impact"))
            .await
            .unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].text,
            "⚠️ Please specify a country: `@gts-ws tariff impact china`"
        );
    }

    #[tokio::test]
    async fn test_summarize_wins_over_help() {
        let f = fixture();
        f.interpreter
            .handle_mention(&mention("@bot summarize help"))
            .await
            .unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .text
            .starts_with("📊 **AI Executive Summary**\n\n📊 GLOBAL TRADE SITUATION SUMMARY"));
    }

    #[tokio::test]
    async fn test_shipping_risk_reply() {
        let f = fixture();
        f.interpreter
            .handle_mention(&mention("@bot SHIPPING RISK?"))
            .await
            .unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("• Panama Canal: Cost Index 145.0 (Disrupted)"));
    }

    #[tokio::test]
    async fn test_help_and_unknown() {
        let f = fixture();
        f.interpreter.handle_mention(&mention("@bot help")).await.unwrap();
        f.interpreter.handle_mention(&mention("@bot good morning")).await.unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].text.starts_with("🤖 **GTS-WS Commands**"));
        assert_eq!(sent[0].text.matches("• `@gts-ws").count(), 4);
        assert_eq!(sent[1].text, "Try: `@gts-ws help` for available commands");
    }

    #[tokio::test]
    async fn test_custom_bot_handle() {
        let f = fixture();
        let interpreter = CommandInterpreter::new(
            Arc::new(SummaryBuilder::new(Arc::clone(&f.db), Arc::new(FailingGenerator))),
            Arc::new(TradeBriefing::new(Arc::clone(&f.db))),
            f.sink.clone(),
        )
        .with_bot_handle("tradebot");

        interpreter.handle_mention(&mention("hello")).await.unwrap();
        assert_eq!(
            f.sink.messages()[0].text,
            "Try: `@tradebot help` for available commands"
        );
    }

    #[tokio::test]
    async fn test_store_failure_still_replies_once() {
        let f = fixture();
        f.db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE shipping_routes")
                .map_err(|e| tradewatch_core::TradewatchError::Storage(e.to_string()))
        })
        .unwrap();

        f.interpreter
            .handle_mention(&mention("@bot shipping risk"))
            .await
            .unwrap();

        let sent = f.sink.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.starts_with("⚠️ Sorry"));
    }
}
