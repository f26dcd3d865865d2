//! Chat-ready briefings over tariff and shipping data.

use std::fmt::Write;
use std::sync::Arc;

use tradewatch_core::text::{format_number, title_case};
use tradewatch_core::types::RouteStatus;
use tradewatch_storage::{Database, ShippingRepository, TariffRepository};

use crate::error::InsightError;

/// Reply when no route is disrupted.
pub const NO_DISRUPTIONS: &str = "✅ No major shipping disruptions currently";

/// Formats tariff-impact and shipping-risk briefings.
pub struct TradeBriefing {
    tariffs: TariffRepository,
    routes: ShippingRepository,
}

impl TradeBriefing {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            tariffs: TariffRepository::new(Arc::clone(&db)),
            routes: ShippingRepository::new(db),
        }
    }

    /// Tariffs imposed on goods exported by `country`, matched ignoring case.
    pub fn tariff_impact(&self, country: &str) -> Result<String, InsightError> {
        let records = self.tariffs.find_by_exporter_ignore_case(country)?;
        if records.is_empty() {
            return Ok(format!("No tariff data found for {}", country));
        }

        let mut out = format!("🚨 **Tariff Impact: {}**\n\n", title_case(country));
        for t in &records {
            let _ = writeln!(
                out,
                "• {}: {}% to {} (Effective: {})",
                title_case(&t.sector),
                format_number(t.tariff_rate),
                t.country_to,
                t.effective_date
            );
        }

        let avg = records.iter().map(|t| t.tariff_rate).sum::<f64>() / records.len() as f64;
        let _ = write!(out, "\n**Average Tariff Rate: {:.1}%**", avg);
        Ok(out)
    }

    /// Disrupted routes with their cost increase over baseline.
    pub fn shipping_risks(&self) -> Result<String, InsightError> {
        let routes = self.routes.find_by_status(RouteStatus::Disrupted)?;
        if routes.is_empty() {
            return Ok(NO_DISRUPTIONS.to_string());
        }

        let mut out = String::from("🚢 **Shipping Disruptions**\n\n");
        for r in &routes {
            let _ = writeln!(
                out,
                "• {}: Cost Index {} ({})",
                r.route_name,
                format_number(r.freight_cost_index),
                r.status
            );
            let _ = writeln!(out, "  └─ Cost increase: {:+.0}%", r.cost_increase_pct());
        }
        Ok(out)
    }
}
