//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, a body size limit
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tradewatch_core::config::TradewatchConfig;
use tradewatch_core::error::TradewatchError;

use crate::handlers;
use crate::slack;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The dashboard is embedded from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let api_routes = Router::new()
        .route("/executive-summary/", get(handlers::executive_summary))
        .route("/kpi-data/", get(handlers::kpi_data))
        .route("/tariff-chart/", get(handlers::tariff_chart))
        .route("/tariffs/", get(handlers::list_tariffs))
        .route("/shipping/", get(handlers::list_shipping))
        .route("/markets/", get(handlers::list_markets))
        .route("/dashboard/", get(handlers::dashboard));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .route("/slack/events/", post(slack::slack_events))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address and port.
pub async fn start_server(config: &TradewatchConfig, state: AppState) -> Result<(), TradewatchError> {
    let addr = format!("{}:{}", config.general.bind_address, config.general.port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TradewatchError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| TradewatchError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
