//! TradeWatch Storage crate - SQLite persistence, aggregate queries, CSV import.
//!
//! Provides a WAL-mode SQLite database with migrations, repositories for
//! tariffs, shipping routes and market rows, the aggregate metrics used by
//! dashboards and summaries, and the bulk CSV importer.

pub mod db;
pub mod import;
pub mod migrations;
pub mod queries;
pub mod repository;

pub use db::Database;
pub use import::{CsvImporter, ImportReport};
pub use queries::{KpiSnapshot, MetricsService, SummaryCounts};
pub use repository::{MarketRepository, ShippingRepository, TariffRepository};
