//! Simulated trade executor.
//!
//! No order ever leaves the process: a weighted coin decides the outcome
//! and the shared counters record the attempt. Failed attempts still
//! count toward `total` and buys/sells, only `successful` is withheld.

use chrono::Utc;
use tracing::{info, warn};

use crate::engine::state::SimulationState;
use crate::rng::RandomSource;
use crate::types::{SwarmError, TradeAction, TradeReceipt};

pub const TRADE_SUCCESS_PROBABILITY: f64 = 0.9;

/// Reject amounts that are not positive finite numbers.
pub fn validate_amount(amount: f64) -> Result<(), SwarmError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(SwarmError::InvalidAmount(amount))
    }
}

/// Decide and record the outcome of one trade at `price`.
pub fn settle(
    state: &mut SimulationState,
    rng: &mut dyn RandomSource,
    action: TradeAction,
    amount: f64,
    price: f64,
) -> Result<TradeReceipt, SwarmError> {
    validate_amount(amount)?;

    let success = rng.chance(TRADE_SUCCESS_PROBABILITY);
    state.record_trade(action, success);

    if !success {
        warn!(%action, amount, price, "Simulated trade failed");
        return Err(SwarmError::TradeExecution("network error".into()));
    }

    let receipt = TradeReceipt {
        success: true,
        trade_id: format!("trade-{}", uuid::Uuid::new_v4()),
        action,
        amount,
        price,
        timestamp: Utc::now(),
    };
    info!(
        trade_id = %receipt.trade_id,
        %action,
        amount,
        price = format!("${price:.2}"),
        counted = state.is_active(),
        "Simulated trade executed"
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;

    fn active() -> SimulationState {
        let mut state = SimulationState::new();
        state.start();
        state
    }

    #[test]
    fn test_success_receipt() {
        let mut state = active();
        let receipt = settle(
            &mut state,
            &mut SequenceSource::constant(0.1),
            TradeAction::Buy,
            2.0,
            3600.5,
        )
        .unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.amount, 2.0);
        assert_eq!(receipt.action, TradeAction::Buy);
        assert!(receipt.price.is_finite() && receipt.price > 0.0);
        assert!(receipt.trade_id.starts_with("trade-"));

        let stats = state.stats();
        assert_eq!((stats.total, stats.buys, stats.successful), (1, 1, 1));
    }

    #[test]
    fn test_failure_still_counts_attempt() {
        let mut state = active();
        let err = settle(
            &mut state,
            &mut SequenceSource::constant(0.95),
            TradeAction::Sell,
            1.0,
            3600.0,
        )
        .unwrap_err();

        assert_eq!(err, SwarmError::TradeExecution("network error".into()));
        let stats = state.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.sells, 1);
        assert_eq!(stats.successful, 0);
    }

    #[test]
    fn test_inactive_trades_are_not_counted() {
        let mut state = SimulationState::new();
        let receipt = settle(
            &mut state,
            &mut SequenceSource::constant(0.0),
            TradeAction::Buy,
            0.5,
            3600.0,
        );
        assert!(receipt.is_ok());
        assert_eq!(state.stats().total, 0);
    }

    #[test]
    fn test_invalid_amounts() {
        let mut state = active();
        let mut rng = SequenceSource::constant(0.0);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                settle(&mut state, &mut rng, TradeAction::Buy, bad, 3600.0),
                Err(SwarmError::InvalidAmount(_))
            ));
        }
        assert_eq!(state.stats().total, 0);
        assert_eq!(rng.draws(), 0);
    }
}
