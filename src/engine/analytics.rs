//! Agent analytics derived from a metrics snapshot.
//!
//! Both views are presentation helpers: decisions are read back out of
//! the Trade Maker's narration, and the trade table is synthesized from
//! the aggregate counters (individual trades are never stored).

use chrono::{DateTime, Duration, Utc};

use crate::rng::RandomSource;
use crate::types::{
    round_cents, round_dp, AgentDecision, AgentName, AgentThought, Decision, SimulationMetrics,
    TradeAction, TradeRecord, TradeStatus,
};

const DECISION_KEYWORDS: &[&str] = &["BUY", "SELL", "momentum", "trend"];

/// Turn Trade Maker thoughts into decisions, newest first.
pub fn derive_decisions(
    thoughts: &[AgentThought],
    rng: &mut dyn RandomSource,
) -> Vec<AgentDecision> {
    let mut decisions: Vec<AgentDecision> = thoughts
        .iter()
        .filter(|t| t.agent_name == AgentName::TradeMaker)
        .filter(|t| DECISION_KEYWORDS.iter().any(|kw| t.thought.contains(kw)))
        .map(|t| {
            let (decision, confidence) = if t.thought.contains("BUY") {
                (Decision::Buy, 70 + rng.index(30) as u32)
            } else if t.thought.contains("SELL") {
                (Decision::Sell, 70 + rng.index(30) as u32)
            } else {
                (Decision::Hold, 50 + rng.index(50) as u32)
            };
            AgentDecision {
                agent_name: t.agent_name,
                timestamp: t.timestamp,
                decision,
                confidence,
                reasoning: t.thought.clone(),
            }
        })
        .collect();

    decisions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    decisions
}

/// Synthesize one row per counted trade, newest first.
///
/// The first `buys` rows are BUY and the rest SELL. Each row succeeds
/// with the snapshot's success rate, is priced inside the observed range
/// and is stamped within the 24 hours before `now`.
pub fn synthesize_trade_history(
    metrics: &SimulationMetrics,
    rng: &mut dyn RandomSource,
    now: DateTime<Utc>,
) -> Vec<TradeRecord> {
    let trades = &metrics.trades;
    let range = &metrics.price_range;
    let stamp = now.timestamp_millis();

    let mut records: Vec<TradeRecord> = (0..trades.total)
        .map(|i| {
            let action = if i < trades.buys {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            let status = if rng.next_unit() <= trades.success_rate {
                TradeStatus::Success
            } else {
                TradeStatus::Failed
            };
            let minutes_ago = rng.index(60 * 24) as i64;
            let price = round_cents(rng.uniform(range.min, range.max));
            let amount = round_dp(rng.uniform(0.05, 0.55), 4);

            TradeRecord {
                id: format!("trade-{stamp}-{i}"),
                timestamp: now - Duration::minutes(minutes_ago),
                action,
                price,
                amount,
                value: round_cents(price * amount),
                status,
            }
        })
        .collect();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}
