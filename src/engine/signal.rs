//! Trading-signal generation.
//!
//! A naive trend follower over a short window of 4h closes. The output
//! is advisory flavor for the dashboard, not a tested strategy.

use crate::rng::RandomSource;
use crate::types::{round_cents, KlineInterval, Recommendation, TradeAction};

/// Kline size and count used for the signal window (24h of 4h candles).
pub const SIGNAL_INTERVAL: KlineInterval = KlineInterval::FourHours;
pub const SIGNAL_WINDOW: u32 = 6;

const MIN_CONFIDENCE: f64 = 70.0;
const MAX_CONFIDENCE: f64 = 100.0;
/// Confidence points per dollar of net movement.
const CONFIDENCE_PER_DOLLAR: f64 = 5.0;

const TARGET_OFFSET: f64 = 200.0;
const STOP_OFFSET: f64 = 150.0;

/// Sum of consecutive close-to-close deltas (equals last − first).
pub fn trend_sum(closes: &[f64]) -> f64 {
    closes.windows(2).map(|w| w[1] - w[0]).sum()
}

/// Recommendation from a window of closes and the current price.
pub fn from_closes(closes: &[f64], current_price: f64) -> Recommendation {
    let sum = trend_sum(closes);
    let action = if sum >= 0.0 {
        TradeAction::Buy
    } else {
        TradeAction::Sell
    };
    let confidence = (MIN_CONFIDENCE + sum.abs() * CONFIDENCE_PER_DOLLAR)
        .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
        .round();

    let reason = match action {
        TradeAction::Buy => "Upward trend detected in the last 24 hours with positive momentum",
        TradeAction::Sell => "Downward trend detected in the last 24 hours with negative momentum",
    };

    build(action, confidence, reason.to_string(), current_price)
}

/// Fallback when no price window is available.
pub fn random(rng: &mut dyn RandomSource, current_price: f64) -> Recommendation {
    let action = if rng.chance(0.5) {
        TradeAction::Buy
    } else {
        TradeAction::Sell
    };
    let confidence = rng.uniform(MIN_CONFIDENCE, MAX_CONFIDENCE).round();
    let reason = match action {
        TradeAction::Buy => "Strong upward trend with increasing volume",
        TradeAction::Sell => "Strong downward trend with decreasing volume",
    };

    build(action, confidence, reason.to_string(), current_price)
}

fn build(action: TradeAction, confidence: f64, reason: String, price: f64) -> Recommendation {
    let (price_target, stop_loss) = match action {
        TradeAction::Buy => (price + TARGET_OFFSET, price - STOP_OFFSET),
        TradeAction::Sell => (price - TARGET_OFFSET, price + STOP_OFFSET),
    };
    Recommendation {
        action,
        confidence,
        reason,
        price_target: round_cents(price_target),
        stop_loss: round_cents(stop_loss),
    }
}
