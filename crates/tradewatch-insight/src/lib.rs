//! TradeWatch Insight crate - executive summaries and trade briefings.
//!
//! - [`SummaryBuilder`] turns store aggregates into an analyst prompt and
//!   falls back to a templated summary when generation fails
//! - [`TradeBriefing`] formats tariff-impact and shipping-risk replies
//! - [`OpenAiClient`] implements [`TextGenerator`] over an OpenAI-compatible API

pub mod briefing;
pub mod error;
pub mod llm;
pub mod summarizer;

pub use briefing::TradeBriefing;
pub use error::InsightError;
pub use llm::{GenerationOptions, OpenAiClient, TextGenerator};
pub use summarizer::{build_prompt, fallback_summary, SummaryBuilder, SummaryInputs};
