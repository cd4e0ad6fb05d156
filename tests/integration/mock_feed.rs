//! Mock price feed for integration testing.
//!
//! Provides a deterministic `PriceFeed` implementation whose price and
//! kline window are fully controllable from test code, with a switch
//! that makes every call fail.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};

use defiswarm::feed::PriceFeed;
use defiswarm::types::{Kline, KlineInterval, SwarmError};

#[derive(Clone)]
pub struct MockFeed {
    price: Arc<Mutex<f64>>,
    closes: Arc<Mutex<Vec<f64>>>,
    calls: Arc<Mutex<usize>>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockFeed {
    pub fn new(price: f64) -> Self {
        Self {
            price: Arc::new(Mutex::new(price)),
            closes: Arc::new(Mutex::new(vec![price; 7])),
            calls: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_price(&self, price: f64) {
        *self.price.lock().unwrap() = price;
    }

    pub fn set_closes(&self, closes: Vec<f64>) {
        *self.closes.lock().unwrap() = closes;
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn check(&self) -> Result<(), SwarmError> {
        *self.calls.lock().unwrap() += 1;
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(SwarmError::FeedUnavailable(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PriceFeed for MockFeed {
    async fn current_price(&self) -> Result<f64, SwarmError> {
        self.check()?;
        Ok(*self.price.lock().unwrap())
    }

    async fn klines(&self, interval: KlineInterval, limit: u32) -> Result<Vec<Kline>, SwarmError> {
        self.check()?;
        let step = match interval {
            KlineInterval::FourHours => Duration::hours(4),
            KlineInterval::OneDay => Duration::days(1),
        };
        let closes = self.closes.lock().unwrap().clone();
        let skip = closes.len().saturating_sub(limit as usize);
        let now = Utc::now();
        let count = closes.len() - skip;
        Ok(closes
            .into_iter()
            .skip(skip)
            .enumerate()
            .map(|(i, close)| Kline {
                open_time: now - step * (count - i) as i32,
                close,
            })
            .collect())
    }
}
