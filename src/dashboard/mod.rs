//! Dashboard — Axum JSON API over the simulation controller.
//!
//! The UI polls these endpoints; no HTML is served.
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use routes::AppState;

/// Serve the API on `port` until `shutdown` resolves.
pub async fn serve<F>(state: AppState, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;

    info!(port, "Dashboard API listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/price", get(routes::get_price))
        .route("/api/price-history", get(routes::get_price_history))
        .route("/api/recommendation", get(routes::get_recommendation))
        .route("/api/activity", get(routes::get_activity))
        .route("/api/trades", post(routes::post_trade))
        .route("/api/trades/history", get(routes::get_trade_history))
        .route("/api/simulation/status", get(routes::get_simulation_status))
        .route("/api/simulation/start", post(routes::start_simulation))
        .route("/api/simulation/stop", post(routes::stop_simulation))
        .route("/api/simulation/metrics", get(routes::get_metrics))
        .route("/api/analytics/decisions", get(routes::get_decisions))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
