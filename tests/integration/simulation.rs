//! End-to-end simulation runs.
//!
//! Drives the state store and the controller through full
//! start → tick → trade → stop cycles and checks the bounded-history
//! and counter guarantees hold for long runs.

use std::sync::Arc;
use std::time::Duration;

use defiswarm::engine::controller::{ControllerSettings, SwarmController};
use defiswarm::engine::state::{self, SimulationState, EVENT_CAP, PRICE_HISTORY_CAP, THOUGHT_CAP};
use defiswarm::engine::synthesizer;
use defiswarm::feed::synthetic::SyntheticMarket;
use defiswarm::feed::PriceSource;
use defiswarm::rng::{RandomSource, RngSource, SequenceSource};
use defiswarm::types::{Impact, SwarmError, TradeAction};

use crate::mock_feed::MockFeed;

fn controller_with(feed: &MockFeed, rng: Box<dyn RandomSource>) -> SwarmController {
    let prices = PriceSource::new(
        Some(Arc::new(feed.clone())),
        SyntheticMarket::new(3600.0, Box::new(RngSource::seeded(11))),
    );
    SwarmController::new(prices, rng, ControllerSettings::immediate(Duration::from_secs(30)))
}

/// Alternating ±10% swings so every tick emits a market event.
fn swinging_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let base = if i % 2 == 0 { 100.0 } else { 110.0 };
            base + i as f64 * 0.001
        })
        .collect()
}

// -- State store ----------------------------------------------------------

#[test]
fn test_long_run_respects_all_caps() {
    let mut store = SimulationState::new();
    let mut rng = RngSource::seeded(42);
    store.start();

    let inputs = swinging_prices(250);
    for (i, &price) in inputs.iter().enumerate() {
        assert!(store.tick(price, &mut rng).is_some());
        assert!(store.prices().count() <= PRICE_HISTORY_CAP, "buffer overflow at tick {i}");
        assert!(store.events().count() <= EVENT_CAP);
        assert!(store.thoughts().count() <= THOUGHT_CAP);
    }

    // Oldest samples were evicted first.
    let kept: Vec<f64> = store.prices().collect();
    assert_eq!(kept.as_slice(), &inputs[inputs.len() - PRICE_HISTORY_CAP..]);
    assert_eq!(store.events().count(), EVENT_CAP);
}

#[test]
fn test_event_list_keeps_newest_ticks() {
    let mut store = SimulationState::new();
    let mut rng = SequenceSource::constant(0.99);
    store.start();

    // Tick 0 has no previous sample; ticks 1..30 each emit one event.
    let inputs: Vec<f64> = (0..30)
        .map(|i| if i % 2 == 0 { 100.0 + i as f64 } else { 115.0 + i as f64 })
        .collect();
    for &price in &inputs {
        store.tick(price, &mut rng);
    }

    let events: Vec<_> = store.events().collect();
    assert_eq!(events.len(), EVENT_CAP);
    let newest = format!("${:.2}", inputs[29]);
    let oldest_kept = format!("${:.2}", inputs[10]);
    let evicted = format!("${:.2}", inputs[9]);
    assert!(events[0].description.ends_with(&newest));
    assert!(events[EVENT_CAP - 1].description.ends_with(&oldest_kept));
    assert!(!events.iter().any(|e| e.description.ends_with(&evicted)));
}

#[test]
fn test_success_rate_matches_counters() {
    let mut store = SimulationState::new();
    let mut rng = RngSource::seeded(7);
    store.start();
    assert_eq!(store.stats().success_rate(), 0.8);

    for price in swinging_prices(200) {
        store.tick(price, &mut rng);
    }

    let stats = store.stats();
    assert!(stats.total > 0);
    assert_eq!(stats.buys + stats.sells, stats.total);
    assert_eq!(
        stats.success_rate(),
        stats.successful as f64 / stats.total as f64
    );
}

#[test]
fn test_restart_clears_previous_run() {
    let mut store = SimulationState::new();
    // Every chance() succeeds: background BUY trades on every tick.
    let mut rng = SequenceSource::constant(0.1);
    store.start();
    for price in [100.0, 105.0, 99.0, 107.0] {
        store.tick(price, &mut rng);
    }
    assert_eq!(store.stats().total, 4);

    store.stop();
    assert!(store.tick(120.0, &mut rng).is_none());
    store.start();

    assert_eq!(store.stats().total, 0);
    assert_eq!(store.prices().count(), 0);
    assert_eq!(store.events().count(), 0);
    assert_eq!(
        store.thoughts().count(),
        synthesizer::onboarding_thoughts().len()
    );
}

#[test]
fn test_double_start_matches_single_start() {
    let mut store = SimulationState::new();
    store.start();
    let once = store.metrics(3600.0);
    store.start();
    assert_eq!(store.metrics(3600.0), once);
}

#[test]
fn test_volatility_example() {
    let v = state::volatility(&[100.0, 101.0, 99.0]);
    assert!((v - 0.0149).abs() < 1e-4, "got {v}");
}

#[test]
fn test_four_percent_jump_is_high_impact() {
    let mut store = SimulationState::new();
    // No narration, no background trade.
    let mut rng = SequenceSource::constant(0.99);
    store.start();
    store.tick(100.0, &mut rng);
    store.tick(104.0, &mut rng);

    let event = store.events().next().unwrap();
    assert_eq!(event.impact, Impact::High);
    assert!(event.description.contains("jumped"));
    assert!(event.description.contains("4.00%"));
}

// -- Controller -----------------------------------------------------------

#[tokio::test]
async fn test_execute_buy_trade_receipt() {
    let feed = MockFeed::new(3650.25);
    let c = controller_with(&feed, Box::new(SequenceSource::constant(0.5)));
    c.start().await;

    let receipt = c.execute_trade(TradeAction::Buy, 2.0).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.amount, 2.0);
    assert_eq!(receipt.action, TradeAction::Buy);
    assert!(receipt.price.is_finite() && receipt.price > 0.0);
    assert_eq!(receipt.price, 3650.25);

    let m = c.metrics().await;
    assert_eq!(m.trades.total, 1);
    assert_eq!(m.trades.buys, 1);
    c.stop().await;
}

#[tokio::test]
async fn test_failed_trade_is_still_counted() {
    let feed = MockFeed::new(3650.25);
    let c = controller_with(&feed, Box::new(SequenceSource::constant(0.95)));
    c.start().await;

    let err = c.execute_trade(TradeAction::Sell, 1.0).await.unwrap_err();
    assert!(matches!(err, SwarmError::TradeExecution(_)));

    let m = c.metrics().await;
    assert_eq!(m.trades.total, 1);
    assert_eq!(m.trades.successful, 0);
    assert_eq!(m.trades.success_rate, 0.0);
    c.stop().await;
}

#[tokio::test]
async fn test_trade_while_stopped_is_not_counted() {
    let feed = MockFeed::new(3650.25);
    let c = controller_with(&feed, Box::new(SequenceSource::constant(0.5)));

    assert!(c.execute_trade(TradeAction::Buy, 1.0).await.is_ok());
    assert_eq!(c.metrics().await.trades.total, 0);
}

#[tokio::test]
async fn test_feed_outage_falls_back_to_synthetic() {
    let feed = MockFeed::new(2999.5);
    let c = controller_with(&feed, Box::new(RngSource::seeded(5)));

    feed.set_error("connection refused");
    let price = c.current_price().await;
    assert!((3582.0..=3618.0).contains(&price), "got {price}");
    assert_eq!(c.price_history().await.len(), 7);
    let rec = c.recommendation().await;
    assert!((70.0..=100.0).contains(&rec.confidence));

    feed.clear_error();
    assert_eq!(c.current_price().await, 2999.5);
    feed.set_price(3012.75);
    assert_eq!(c.current_price().await, 3012.75);
}

#[tokio::test]
async fn test_recommendation_follows_rising_window() {
    let feed = MockFeed::new(3595.0);
    feed.set_closes(vec![3400.0, 3450.0, 3500.0, 3510.0, 3530.0, 3560.0, 3580.0]);
    let c = controller_with(&feed, Box::new(RngSource::seeded(5)));

    let rec = c.recommendation().await;
    assert_eq!(rec.action, TradeAction::Buy);
    assert_eq!(rec.confidence, 100.0);
    assert_eq!(rec.price_target, 3795.0);
    assert_eq!(rec.stop_loss, 3445.0);
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_ticks_use_feed_price() {
    let feed = MockFeed::new(3000.0);
    let c = controller_with(&feed, Box::new(RngSource::seeded(8)));
    c.start().await;

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(feed.calls(), 2);
    let m = c.metrics().await;
    assert_eq!(m.average_price, 3000.0);
    assert_eq!(m.price_range.min, 3000.0);
    assert_eq!(m.volatility, 0.0);

    c.stop().await;
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(feed.calls(), 2);
}

#[test]
fn test_controller_start_is_idempotent() {
    tokio_test::block_on(async {
        let feed = MockFeed::new(3000.0);
        let c = controller_with(&feed, Box::new(SequenceSource::constant(0.99)));
        c.start().await;
        let first = c.metrics().await;
        assert!(c.start().await.active);
        assert!(c.is_scheduler_armed().await);
        let second = c.metrics().await;
        assert_eq!(first.agent_thoughts, second.agent_thoughts);
        assert_eq!(first.trades, second.trades);
        c.stop().await;
    });
}
