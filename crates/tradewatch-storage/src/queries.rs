//! Aggregate queries for dashboards and summaries.
//!
//! Counts, averages and distinct-value counts over the three record
//! tables. Thresholds come from `tradewatch_core::types` so every caller
//! applies the same business constants.

use std::sync::Arc;

use rusqlite::Connection;

use tradewatch_core::error::TradewatchError;
use tradewatch_core::types::{RouteStatus, DECLINING_THRESHOLD, HIGH_TARIFF_THRESHOLD};

use crate::db::Database;

/// Headline dashboard indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSnapshot {
    /// Mean of all tariff rates, 0.0 when there are none.
    pub avg_tariff: f64,
    pub disrupted_routes: u64,
    /// Distinct sectors with at least one negative 7-day change.
    pub declining_sectors: u64,
}

/// Counts feeding the executive summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryCounts {
    pub high_tariffs: u64,
    pub disrupted_routes: u64,
    /// Raw number of market rows with a negative change (not distinct sectors).
    pub declining_records: u64,
}

/// Aggregate query service.
pub struct MetricsService {
    db: Arc<Database>,
}

impl MetricsService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Number of tariffs at or above the high-tariff threshold.
    pub fn count_high_tariffs(&self) -> Result<u64, TradewatchError> {
        self.db.with_conn(|conn| {
            count(
                conn,
                "SELECT COUNT(*) FROM tariffs WHERE tariff_rate >= ?1",
                &[&HIGH_TARIFF_THRESHOLD],
            )
        })
    }

    /// Number of routes whose status is Disrupted.
    pub fn count_disrupted_routes(&self) -> Result<u64, TradewatchError> {
        self.db.with_conn(|conn| {
            count(
                conn,
                "SELECT COUNT(*) FROM shipping_routes WHERE status = ?1",
                &[&RouteStatus::Disrupted.as_str()],
            )
        })
    }

    /// Number of market rows whose 7-day change is below `DECLINING_THRESHOLD`.
    pub fn count_declining_records(&self) -> Result<u64, TradewatchError> {
        self.db.with_conn(|conn| {
            count(
                conn,
                "SELECT COUNT(*) FROM market_data WHERE price_change_7d < ?1",
                &[&DECLINING_THRESHOLD],
            )
        })
    }

    /// Number of distinct sectors with at least one declining row.
    pub fn count_declining_sectors(&self) -> Result<u64, TradewatchError> {
        self.db.with_conn(|conn| {
            count(
                conn,
                "SELECT COUNT(DISTINCT sector) FROM market_data WHERE price_change_7d < ?1",
                &[&DECLINING_THRESHOLD],
            )
        })
    }

    /// Mean tariff rate across all records, 0.0 when the table is empty.
    pub fn average_tariff_rate(&self) -> Result<f64, TradewatchError> {
        self.db.with_conn(|conn| {
            let avg: Option<f64> = conn
                .query_row("SELECT AVG(tariff_rate) FROM tariffs", [], |row| row.get(0))
                .map_err(|e| TradewatchError::Storage(format!("Average query: {}", e)))?;
            Ok(avg.unwrap_or(0.0))
        })
    }

    /// KPI snapshot for the dashboard endpoints.
    pub fn kpis(&self) -> Result<KpiSnapshot, TradewatchError> {
        Ok(KpiSnapshot {
            avg_tariff: self.average_tariff_rate()?,
            disrupted_routes: self.count_disrupted_routes()?,
            declining_sectors: self.count_declining_sectors()?,
        })
    }

    /// Counts used by the executive summary.
    pub fn summary_counts(&self) -> Result<SummaryCounts, TradewatchError> {
        Ok(SummaryCounts {
            high_tariffs: self.count_high_tariffs()?,
            disrupted_routes: self.count_disrupted_routes()?,
            declining_records: self.count_declining_records()?,
        })
    }
}

fn count(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<u64, TradewatchError> {
    let n: i64 = conn
        .query_row(sql, params, |row| row.get(0))
        .map_err(|e| TradewatchError::Storage(format!("Count query: {}", e)))?;
    Ok(n as u64)
}
