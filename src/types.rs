//! Shared types for the DeFiSwarm simulation core.
//!
//! These types form the data model used across all modules and are
//! serialized with the field names the dashboard front-end expects.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// A single point of the chart history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub price: f64,
}

/// A kline (candlestick) reduced to the fields the core uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub close: f64,
}

impl Kline {
    pub fn to_price_point(&self) -> PricePoint {
        PricePoint {
            date: self.open_time.format("%Y-%m-%d").to_string(),
            price: self.close,
        }
    }
}

/// Kline bucket sizes requested from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlineInterval {
    FourHours,
    OneDay,
}

impl KlineInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::FourHours => "4h",
            KlineInterval::OneDay => "1d",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round a USD amount to whole cents.
pub fn round_cents(value: f64) -> f64 {
    round_dp(value, 2)
}

/// Round to `dp` decimal places using decimal (not binary) rounding.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for TradeAction {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            other => Err(SwarmError::UnknownAction(other.to_string())),
        }
    }
}

/// Qualitative severity of a market event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::Low => write!(f, "LOW"),
            Impact::Medium => write!(f, "MEDIUM"),
            Impact::High => write!(f, "HIGH"),
        }
    }
}

/// Named narration sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentName {
    #[serde(rename = "Price Checker Agent")]
    PriceChecker,
    #[serde(rename = "Trade Maker Agent")]
    TradeMaker,
    #[serde(rename = "Trade Logger Agent")]
    TradeLogger,
}

impl AgentName {
    pub const ALL: &'static [AgentName] = &[
        AgentName::PriceChecker,
        AgentName::TradeMaker,
        AgentName::TradeLogger,
    ];
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentName::PriceChecker => write!(f, "Price Checker Agent"),
            AgentName::TradeMaker => write!(f, "Trade Maker Agent"),
            AgentName::TradeLogger => write!(f, "Trade Logger Agent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentThought {
    pub agent_name: AgentName,
    pub timestamp: DateTime<Utc>,
    pub thought: String,
}

impl AgentThought {
    pub fn now(agent_name: AgentName, thought: impl Into<String>) -> Self {
        Self {
            agent_name,
            timestamp: Utc::now(),
            thought: thought.into(),
        }
    }
}

/// Success rate reported before any trade has been attempted.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;

/// Trade counters for the current simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total: u64,
    pub buys: u64,
    pub sells: u64,
    pub successful: u64,
}

impl TradeStats {
    /// Count one attempted trade.
    pub fn record(&mut self, action: TradeAction, success: bool) {
        self.total += 1;
        match action {
            TradeAction::Buy => self.buys += 1,
            TradeAction::Sell => self.sells += 1,
        }
        if success {
            self.successful += 1;
        }
    }

    /// `successful / total`, or [`DEFAULT_SUCCESS_RATE`] with no trades.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            DEFAULT_SUCCESS_RATE
        } else {
            self.successful as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Metrics snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSummary {
    pub total: u64,
    pub buys: u64,
    pub sells: u64,
    pub successful: u64,
    pub success_rate: f64,
}

impl From<TradeStats> for TradeSummary {
    fn from(stats: TradeStats) -> Self {
        Self {
            total: stats.total,
            buys: stats.buys,
            sells: stats.sells,
            successful: stats.successful,
            success_rate: stats.success_rate(),
        }
    }
}

/// Read-only snapshot of the simulation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetrics {
    pub volatility: f64,
    pub average_price: f64,
    pub price_range: PriceRange,
    pub trades: TradeSummary,
    pub events: Vec<MarketEvent>,
    pub agent_thoughts: Vec<AgentThought>,
}

// ---------------------------------------------------------------------------
// Trades & signals
// ---------------------------------------------------------------------------

/// Receipt returned after a simulated trade succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    pub success: bool,
    pub trade_id: String,
    pub action: TradeAction,
    pub amount: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Advisory trading signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: TradeAction,
    pub confidence: f64,
    pub reason: String,
    pub price_target: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Analysis,
    PriceAlert,
    TradeSignal,
    System,
}

impl ActivityKind {
    pub const ALL: &'static [ActivityKind] = &[
        ActivityKind::Analysis,
        ActivityKind::PriceAlert,
        ActivityKind::TradeSignal,
        ActivityKind::System,
    ];
}

/// Entry of the synthetic activity feed (unrelated to [`MarketEvent`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub impact: Impact,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDecision {
    pub agent_name: AgentName,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub confidence: u32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Success,
    Failed,
}

/// Row of the synthetic trade-history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub action: TradeAction,
    pub price: f64,
    pub amount: f64,
    pub value: f64,
    pub status: TradeStatus,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for DeFiSwarm.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SwarmError {
    #[error("Price feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Trade simulation failed - {0}")]
    TradeExecution(String),

    #[error("Invalid trade amount: {0}")]
    InvalidAmount(f64),

    #[error("Unknown trade action: {0}")]
    UnknownAction(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_action_display_and_parse() {
        assert_eq!(format!("{}", TradeAction::Buy), "BUY");
        assert_eq!(format!("{}", TradeAction::Sell), "SELL");
        assert_eq!("buy".parse::<TradeAction>().unwrap(), TradeAction::Buy);
        assert_eq!("SELL".parse::<TradeAction>().unwrap(), TradeAction::Sell);
        assert!("hold".parse::<TradeAction>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&TradeAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Impact::Medium).unwrap(), "\"MEDIUM\"");
        assert_eq!(
            serde_json::to_string(&AgentName::TradeLogger).unwrap(),
            "\"Trade Logger Agent\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityKind::PriceAlert).unwrap(),
            "\"PRICE_ALERT\""
        );
    }

    #[test]
    fn test_success_rate_default_when_no_trades() {
        let stats = TradeStats::default();
        assert_eq!(stats.success_rate(), 0.8);
    }

    #[test]
    fn test_success_rate_ratio() {
        let mut stats = TradeStats::default();
        stats.record(TradeAction::Buy, true);
        stats.record(TradeAction::Sell, false);
        stats.record(TradeAction::Sell, true);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.buys, 1);
        assert_eq!(stats.sells, 2);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.success_rate(), 2.0 / 3.0);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(3601.2349), 3601.23);
        assert_eq!(round_cents(99.999), 100.0);
        assert_eq!(round_dp(0.123456, 4), 0.1235);
    }

    #[test]
    fn test_kline_to_price_point() {
        let kline = Kline {
            open_time: Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap(),
            close: 3550.5,
        };
        let point = kline.to_price_point();
        assert_eq!(point.date, "2026-03-14");
        assert_eq!(point.price, 3550.5);
    }

    #[test]
    fn test_metrics_serializes_camel_case() {
        let metrics = SimulationMetrics {
            volatility: 0.0,
            average_price: 3600.0,
            price_range: PriceRange { min: 3600.0, max: 3600.0 },
            trades: TradeStats::default().into(),
            events: Vec::new(),
            agent_thoughts: vec![AgentThought::now(AgentName::PriceChecker, "hello")],
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["averagePrice"], 3600.0);
        assert_eq!(json["trades"]["successRate"], 0.8);
        assert_eq!(json["agentThoughts"][0]["agentName"], "Price Checker Agent");
    }

    #[test]
    fn test_trade_error_message() {
        let err = SwarmError::TradeExecution("network error".into());
        assert_eq!(err.to_string(), "Trade simulation failed - network error");
    }
}
