//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is the cloneable [`SwarmController`].

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::engine::controller::SwarmController;
use crate::types::{
    Activity, AgentDecision, PricePoint, Recommendation, SimulationMetrics, SimulationStatus,
    SwarmError, TradeAction, TradeReceipt, TradeRecord,
};

pub type AppState = SwarmController;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub price: f64,
}

/// Body of `POST /api/trades`. The action is parsed case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub action: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps domain errors onto HTTP status codes.
pub struct ApiError(SwarmError);

impl From<SwarmError> for ApiError {
    fn from(e: SwarmError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SwarmError::InvalidAmount(_) | SwarmError::UnknownAction(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SwarmError::TradeExecution(_) | SwarmError::FeedUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/price
pub async fn get_price(State(state): State<AppState>) -> Json<PriceResponse> {
    Json(PriceResponse {
        price: state.current_price().await,
    })
}

/// GET /api/price-history
pub async fn get_price_history(State(state): State<AppState>) -> Json<Vec<PricePoint>> {
    Json(state.price_history().await)
}

/// GET /api/recommendation
pub async fn get_recommendation(State(state): State<AppState>) -> Json<Recommendation> {
    Json(state.recommendation().await)
}

/// GET /api/activity
pub async fn get_activity(State(state): State<AppState>) -> Json<Vec<Activity>> {
    Json(state.activity_log().await)
}

/// POST /api/trades
pub async fn post_trade(
    State(state): State<AppState>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<TradeReceipt>, ApiError> {
    let action: TradeAction = req.action.parse()?;
    let receipt = state.execute_trade(action, req.amount).await?;
    Ok(Json(receipt))
}

/// GET /api/trades/history
pub async fn get_trade_history(State(state): State<AppState>) -> Json<Vec<TradeRecord>> {
    Json(state.trade_history().await)
}

/// GET /api/simulation/status
pub async fn get_simulation_status(State(state): State<AppState>) -> Json<SimulationStatus> {
    Json(state.status().await)
}

/// POST /api/simulation/start
pub async fn start_simulation(State(state): State<AppState>) -> Json<SimulationStatus> {
    Json(state.start().await)
}

/// POST /api/simulation/stop
pub async fn stop_simulation(State(state): State<AppState>) -> Json<SimulationStatus> {
    Json(state.stop().await)
}

/// GET /api/simulation/metrics
pub async fn get_metrics(State(state): State<AppState>) -> Json<SimulationMetrics> {
    Json(state.metrics().await)
}

/// GET /api/analytics/decisions
pub async fn get_decisions(State(state): State<AppState>) -> Json<Vec<AgentDecision>> {
    Json(state.agent_decisions().await)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
