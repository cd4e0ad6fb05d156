//! Simulation state store.
//!
//! Holds the running flag, the bounded price buffer, the bounded
//! event and thought lists, and the trade counters. All mutation is
//! synchronous; callers provide the randomness and the current price.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::engine::synthesizer::{self, TickContext};
use crate::rng::RandomSource;
use crate::types::{
    AgentThought, MarketEvent, PriceRange, SimulationMetrics, SimulationStatus, TradeAction,
    TradeStats,
};

pub const PRICE_HISTORY_CAP: usize = 100;
pub const EVENT_CAP: usize = 20;
pub const THOUGHT_CAP: usize = 30;

/// Probability that a tick also synthesizes a background trade.
pub const BACKGROUND_TRADE_PROBABILITY: f64 = 0.3;
/// Success probability of a background trade.
pub const BACKGROUND_TRADE_SUCCESS: f64 = 0.8;

/// What a single accepted tick did to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub price: f64,
    pub change: f64,
    pub events_added: usize,
    pub thoughts_added: usize,
    pub background_trade: Option<(TradeAction, bool)>,
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    active: bool,
    prices: VecDeque<f64>,
    events: VecDeque<MarketEvent>,
    thoughts: VecDeque<AgentThought>,
    stats: TradeStats,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            active: false,
            prices: VecDeque::with_capacity(PRICE_HISTORY_CAP),
            events: VecDeque::with_capacity(EVENT_CAP),
            thoughts: VecDeque::with_capacity(THOUGHT_CAP),
            stats: TradeStats::default(),
        }
    }

    // -- Lifecycle --------------------------------------------------------

    /// Begin a new run. No-op if already active.
    pub fn start(&mut self) -> SimulationStatus {
        if self.active {
            return self.status();
        }

        self.active = true;
        self.prices.clear();
        self.events.clear();
        self.thoughts.clear();
        self.stats = TradeStats::default();
        for thought in synthesizer::onboarding_thoughts() {
            self.push_thought(thought);
        }

        info!("Simulation started");
        self.status()
    }

    /// Freeze the run and append the closing summaries. No-op if inactive.
    pub fn stop(&mut self) -> SimulationStatus {
        if !self.active {
            return self.status();
        }

        self.active = false;
        let summaries =
            synthesizer::summary_thoughts(&self.stats, self.prices.len(), self.events.len());
        for thought in summaries {
            self.push_thought(thought);
        }

        info!(
            trades = self.stats.total,
            successful = self.stats.successful,
            samples = self.prices.len(),
            "Simulation stopped"
        );
        self.status()
    }

    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            active: self.active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // -- Mutation ---------------------------------------------------------

    /// Feed one price sample through the synthesizer.
    ///
    /// Returns `None` (and leaves the store untouched) while inactive.
    pub fn record_price(&mut self, price: f64, rng: &mut dyn RandomSource) -> Option<TickReport> {
        if !self.active || !price.is_finite() || price <= 0.0 {
            return None;
        }

        let change = self
            .prices
            .back()
            .map(|&previous| synthesizer::percent_change(previous, price))
            .unwrap_or(0.0);

        if self.prices.len() == PRICE_HISTORY_CAP {
            self.prices.pop_front();
        }
        self.prices.push_back(price);

        let mut events_added = 0;
        if let Some(event) = synthesizer::market_event(change, price) {
            self.push_event(event);
            events_added += 1;
        }

        let ctx = TickContext {
            price,
            change,
            volatility: self.volatility(),
            stats: self.stats,
        };
        let thoughts = synthesizer::narrate(&ctx, rng);
        let thoughts_added = thoughts.len();
        for thought in thoughts {
            self.push_thought(thought);
        }

        Some(TickReport {
            price,
            change,
            events_added,
            thoughts_added,
            background_trade: None,
        })
    }

    /// One scheduled tick: record the price, then maybe synthesize a
    /// background trade and log it as a market event.
    pub fn tick(&mut self, price: f64, rng: &mut dyn RandomSource) -> Option<TickReport> {
        let mut report = self.record_price(price, rng)?;

        if rng.chance(BACKGROUND_TRADE_PROBABILITY) {
            let action = if rng.chance(0.5) {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            let success = rng.chance(BACKGROUND_TRADE_SUCCESS);
            self.record_trade(action, success);
            self.push_event(synthesizer::simulated_trade_event(action, success, price));
            report.events_added += 1;
            report.background_trade = Some((action, success));
        }

        debug!(
            price = report.price,
            change_pct = format!("{:.3}%", report.change * 100.0),
            events = report.events_added,
            thoughts = report.thoughts_added,
            "Tick applied"
        );
        Some(report)
    }

    /// Count a trade attempt. Ignored while inactive.
    pub fn record_trade(&mut self, action: TradeAction, success: bool) {
        if self.active {
            self.stats.record(action, success);
        }
    }

    fn push_event(&mut self, event: MarketEvent) {
        self.events.push_front(event);
        self.events.truncate(EVENT_CAP);
    }

    fn push_thought(&mut self, thought: AgentThought) {
        self.thoughts.push_front(thought);
        self.thoughts.truncate(THOUGHT_CAP);
    }

    // -- Reads ------------------------------------------------------------

    /// Raw samples, oldest first.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().copied()
    }

    /// Events, newest first.
    pub fn events(&self) -> impl Iterator<Item = &MarketEvent> {
        self.events.iter()
    }

    /// Thoughts, newest first.
    pub fn thoughts(&self) -> impl Iterator<Item = &AgentThought> {
        self.thoughts.iter()
    }

    pub fn stats(&self) -> TradeStats {
        self.stats
    }

    /// Population standard deviation of successive fractional returns.
    pub fn volatility(&self) -> f64 {
        let prices: Vec<f64> = self.prices.iter().copied().collect();
        volatility(&prices)
    }

    /// Snapshot for the dashboard. `fallback_price` stands in for the
    /// average and range while the buffer is empty.
    pub fn metrics(&self, fallback_price: f64) -> SimulationMetrics {
        let (average_price, price_range) = if self.prices.is_empty() {
            (
                fallback_price,
                PriceRange {
                    min: fallback_price,
                    max: fallback_price,
                },
            )
        } else {
            let sum: f64 = self.prices.iter().sum();
            let min = self.prices.iter().copied().fold(f64::INFINITY, f64::min);
            let max = self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (sum / self.prices.len() as f64, PriceRange { min, max })
        };

        SimulationMetrics {
            volatility: self.volatility(),
            average_price,
            price_range,
            trades: self.stats.into(),
            events: self.events.iter().cloned().collect(),
            agent_thoughts: self.thoughts.iter().cloned().collect(),
        }
    }
}

/// Population standard deviation of successive fractional returns;
/// 0 with fewer than two samples.
pub fn volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .map(|w| synthesizer::percent_change(w[0], w[1]))
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
