use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TradewatchError;
use crate::text::format_number;

// =============================================================================
// Business thresholds
// =============================================================================

/// A tariff at or above this rate (percent) counts as "high".
pub const HIGH_TARIFF_THRESHOLD: f64 = 20.0;

/// A 7-day price change strictly below this value (percent) counts as declining.
pub const DECLINING_THRESHOLD: f64 = 0.0;

/// Freight cost index value representing normal shipping cost.
pub const BASELINE_COST_INDEX: f64 = 100.0;

// =============================================================================
// Enums
// =============================================================================

/// Operating status of a shipping route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteStatus {
    #[default]
    Normal,
    Disrupted,
    Blocked,
}

impl RouteStatus {
    /// The string stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Normal => "Normal",
            RouteStatus::Disrupted => "Disrupted",
            RouteStatus::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteStatus {
    type Err = TradewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(RouteStatus::Normal),
            "Disrupted" => Ok(RouteStatus::Disrupted),
            "Blocked" => Ok(RouteStatus::Blocked),
            other => Err(TradewatchError::Serialization(format!(
                "Unknown route status '{}'. Must be one of: Normal, Disrupted, Blocked",
                other
            ))),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Tariff rate applied to one sector's goods moving between two countries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    /// Exporting country.
    pub country_from: String,
    /// Importing country.
    pub country_to: String,
    /// Industry sector.
    pub sector: String,
    /// Tariff percentage.
    pub tariff_rate: f64,
    /// When the tariff takes effect.
    pub effective_date: NaiveDate,
}

impl fmt::Display for TariffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}: {}% ({})",
            self.country_from,
            self.country_to,
            format_number(self.tariff_rate),
            self.sector
        )
    }
}

/// A major shipping route and its current condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingRoute {
    pub route_name: String,
    pub status: RouteStatus,
    /// Normalized freight cost, 100 = baseline.
    pub freight_cost_index: f64,
    /// Set by the store on every write.
    pub last_updated: DateTime<Utc>,
}

impl ShippingRoute {
    /// Percentage change of the cost index relative to baseline.
    pub fn cost_increase_pct(&self) -> f64 {
        (self.freight_cost_index - BASELINE_COST_INDEX) / BASELINE_COST_INDEX * 100.0
    }
}

impl fmt::Display for ShippingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} (Index: {})",
            self.route_name,
            self.status,
            format_number(self.freight_cost_index)
        )
    }
}

/// Seven-day price movement of one market symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Stock or ETF symbol.
    pub symbol: String,
    pub sector: String,
    /// 7-day price change in percent (signed).
    pub price_change_7d: f64,
    pub date: NaiveDate,
}

impl fmt::Display for MarketRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {:+.2}%",
            self.symbol, self.sector, self.price_change_7d
        )
    }
}
