//! Route handler functions for the dashboard API.
//!
//! Each handler reads through the services in AppState and returns a
//! JSON response. Listing endpoints wrap rows in `{results: [...]}`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use tradewatch_core::text::title_case;
use tradewatch_core::types::{MarketRecord, ShippingRoute, TariffRecord};

use crate::error::{ApiError, StatusError};
use crate::state::AppState;

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TariffChartParams {
    pub country: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KpiResponse {
    pub avg_tariff: f64,
    pub disrupted_routes: u64,
    pub declining_sectors: u64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TariffChartPoint {
    pub country_to: String,
    pub tariff_rate: f64,
    pub sector: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TariffChartResponse {
    pub country: String,
    pub data: Vec<TariffChartPoint>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub avg_tariff: f64,
    pub disrupted_routes: u64,
    pub declining_sectors: u64,
    pub summary: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/executive-summary/ - AI executive summary.
pub async fn executive_summary(State(state): State<AppState>) -> (StatusCode, Json<SummaryResponse>) {
    match state.summary.generate_executive_summary().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(SummaryResponse {
                summary,
                status: STATUS_SUCCESS.to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "Executive summary failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SummaryResponse {
                    summary: format!("Error generating summary: {}", e),
                    status: STATUS_ERROR.to_string(),
                }),
            )
        }
    }
}

/// GET /api/kpi-data/ - Headline indicators.
pub async fn kpi_data(State(state): State<AppState>) -> Result<Json<KpiResponse>, StatusError> {
    let kpis = state.metrics.kpis()?;
    Ok(Json(KpiResponse {
        avg_tariff: kpis.avg_tariff,
        disrupted_routes: kpis.disrupted_routes,
        declining_sectors: kpis.declining_sectors,
        status: STATUS_SUCCESS.to_string(),
    }))
}

/// GET /api/tariff-chart/?country=X - Tariffs exported by one country.
///
/// The country is title-cased and matched exactly, so `china` finds
/// rows stored as `China`.
pub async fn tariff_chart(
    State(state): State<AppState>,
    Query(params): Query<TariffChartParams>,
) -> Result<Json<TariffChartResponse>, StatusError> {
    let country = title_case(params.country.as_deref().unwrap_or_default());
    let data = state
        .tariffs
        .find_by_exporter(&country)?
        .into_iter()
        .map(|t| TariffChartPoint {
            country_to: t.country_to,
            tariff_rate: t.tariff_rate,
            sector: t.sector,
        })
        .collect();

    Ok(Json(TariffChartResponse {
        country,
        data,
        status: STATUS_SUCCESS.to_string(),
    }))
}

/// GET /api/tariffs/ - All tariff records.
pub async fn list_tariffs(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<TariffRecord>>, ApiError> {
    Ok(Json(ListResponse {
        results: state.tariffs.list_all()?,
    }))
}

/// GET /api/shipping/ - All shipping routes.
pub async fn list_shipping(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<ShippingRoute>>, ApiError> {
    Ok(Json(ListResponse {
        results: state.shipping.list_all()?,
    }))
}

/// GET /api/markets/ - All market rows.
pub async fn list_markets(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<MarketRecord>>, ApiError> {
    Ok(Json(ListResponse {
        results: state.markets.list_all()?,
    }))
}

/// GET /api/dashboard/ - KPI fields plus the executive summary.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let kpis = state.metrics.kpis()?;
    let summary = state.summary.generate_executive_summary().await?;
    Ok(Json(DashboardResponse {
        avg_tariff: kpis.avg_tariff,
        disrupted_routes: kpis.disrupted_routes,
        declining_sectors: kpis.declining_sectors,
        summary,
    }))
}
