//! Market-event and agent-thought synthesis.
//!
//! Turns each accepted price sample into zero or more market events and
//! agent thoughts. The thoughts are decorative narration drawn from a
//! [`RandomSource`]; nothing here feeds back into trading decisions.

use chrono::Utc;

use crate::rng::RandomSource;
use crate::types::{AgentName, AgentThought, Impact, MarketEvent, TradeAction, TradeStats};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimum absolute move for a market event.
pub const EVENT_THRESHOLD: f64 = 0.01;
pub const MEDIUM_IMPACT_THRESHOLD: f64 = 0.02;
pub const HIGH_IMPACT_THRESHOLD: f64 = 0.03;

/// Buffer volatility above which the Trade Maker talks about positioning.
pub const VOLATILITY_ALERT: f64 = 0.02;

pub const PRICE_CHECKER_PROBABILITY: f64 = 0.4;
pub const TRADE_MAKER_PROBABILITY: f64 = 0.3;
pub const TRADE_LOGGER_PROBABILITY: f64 = 0.2;

// ---------------------------------------------------------------------------
// Market events
// ---------------------------------------------------------------------------

/// Fractional change from `previous` to `current`. Zero if `previous`
/// is not a positive price.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous <= 0.0 || !previous.is_finite() {
        return 0.0;
    }
    (current - previous) / previous
}

/// Impact label for a fractional move, or `None` below the event threshold.
pub fn classify_impact(change: f64) -> Option<Impact> {
    let magnitude = change.abs();
    if magnitude > HIGH_IMPACT_THRESHOLD {
        Some(Impact::High)
    } else if magnitude > MEDIUM_IMPACT_THRESHOLD {
        Some(Impact::Medium)
    } else if magnitude > EVENT_THRESHOLD {
        Some(Impact::Low)
    } else {
        None
    }
}

/// Build the market event for a price move, if it is large enough.
pub fn market_event(change: f64, price: f64) -> Option<MarketEvent> {
    let impact = classify_impact(change)?;
    let direction = if change > 0.0 { "jumped" } else { "dropped" };
    Some(MarketEvent {
        timestamp: Utc::now(),
        description: format!(
            "ETH price {direction} {:.2}% to ${price:.2}",
            change.abs() * 100.0
        ),
        impact,
    })
}

/// Event logged for a trade synthesized by the scheduler.
pub fn simulated_trade_event(action: TradeAction, success: bool, price: f64) -> MarketEvent {
    let (outcome, impact) = if success {
        ("executed", Impact::Low)
    } else {
        ("failed", Impact::Medium)
    };
    MarketEvent {
        timestamp: Utc::now(),
        description: format!("Simulated {action} order {outcome} at ${price:.2}"),
        impact,
    }
}

// ---------------------------------------------------------------------------
// Agent thoughts
// ---------------------------------------------------------------------------

/// Inputs the agents narrate about on a single tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub price: f64,
    pub change: f64,
    pub volatility: f64,
    pub stats: TradeStats,
}

/// Draw this tick's thoughts.
///
/// Each agent is gated by its own draw, in the order Price Checker,
/// Trade Maker, Trade Logger. The Trade Logger takes one extra draw for
/// its PnL flavor when it speaks. Returned in emission order.
pub fn narrate(ctx: &TickContext, rng: &mut dyn RandomSource) -> Vec<AgentThought> {
    let mut thoughts = Vec::new();

    if rng.chance(PRICE_CHECKER_PROBABILITY) {
        thoughts.push(AgentThought::now(AgentName::PriceChecker, price_checker_text(ctx)));
    }

    if rng.chance(TRADE_MAKER_PROBABILITY) {
        thoughts.push(AgentThought::now(AgentName::TradeMaker, trade_maker_text(ctx)));
    }

    if rng.chance(TRADE_LOGGER_PROBABILITY) {
        let positive = rng.chance(0.5);
        thoughts.push(AgentThought::now(
            AgentName::TradeLogger,
            trade_logger_text(&ctx.stats, positive),
        ));
    }

    thoughts
}

fn price_checker_text(ctx: &TickContext) -> String {
    let pct = ctx.change * 100.0;
    if ctx.change.abs() > EVENT_THRESHOLD {
        let direction = if ctx.change > 0.0 { "upward" } else { "downward" };
        format!(
            "Significant {direction} move of {:.2}% detected. ETH now trading at ${:.2}.",
            pct.abs(),
            ctx.price
        )
    } else {
        format!(
            "ETH steady at ${:.2} ({pct:+.2}%). No significant movement.",
            ctx.price
        )
    }
}

fn trade_maker_text(ctx: &TickContext) -> String {
    if ctx.volatility > VOLATILITY_ALERT {
        if ctx.change > 0.0 {
            format!(
                "Volatility at {:.2}% with upward momentum. Considering a BUY position.",
                ctx.volatility * 100.0
            )
        } else {
            format!(
                "Volatility at {:.2}% with downward pressure. Considering a SELL position.",
                ctx.volatility * 100.0
            )
        }
    } else {
        "Market in consolidation. Holding current position until a clear trend forms."
            .to_string()
    }
}

fn trade_logger_text(stats: &TradeStats, positive_pnl: bool) -> String {
    let flavor = if positive_pnl {
        "Unrealized PnL is positive so far."
    } else {
        "Unrealized PnL is slightly negative; monitoring exposure."
    };
    format!(
        "Logged {} trades ({} buys / {} sells), {:.0}% success rate. {flavor}",
        stats.total,
        stats.buys,
        stats.sells,
        stats.success_rate() * 100.0
    )
}

/// Fixed thoughts seeded when a simulation starts, one per agent.
pub fn onboarding_thoughts() -> Vec<AgentThought> {
    vec![
        AgentThought::now(
            AgentName::PriceChecker,
            "Price monitoring online. Tracking ETH/USDT for significant movements.",
        ),
        AgentThought::now(
            AgentName::TradeMaker,
            "Ready to evaluate market conditions and place simulated trades.",
        ),
        AgentThought::now(
            AgentName::TradeLogger,
            "Trade ledger initialized. Recording all simulated activity.",
        ),
    ]
}

/// Final thoughts appended when a simulation stops.
pub fn summary_thoughts(stats: &TradeStats, samples: usize, events: usize) -> Vec<AgentThought> {
    vec![
        AgentThought::now(
            AgentName::PriceChecker,
            format!("Session closed after {samples} price samples and {events} market events."),
        ),
        AgentThought::now(
            AgentName::TradeMaker,
            format!(
                "Stopped trading. Placed {} buys and {} sells this session.",
                stats.buys, stats.sells
            ),
        ),
        AgentThought::now(
            AgentName::TradeLogger,
            format!(
                "Final tally: {} trades, {} successful ({:.0}% success rate).",
                stats.total,
                stats.successful,
                stats.success_rate() * 100.0
            ),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
