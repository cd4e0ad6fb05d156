//! Price feeds.
//!
//! Defines the `PriceFeed` trait and the [`PriceSource`] adapter that the
//! rest of the crate consumes. The adapter never fails: any feed error is
//! logged and replaced by synthetic data.
//!
//! - `binance` — public REST ticker/kline endpoints
//! - `synthetic` — random-walk fallback generator

pub mod binance;
pub mod synthetic;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::types::{Kline, KlineInterval, PricePoint, SwarmError};
use synthetic::SyntheticMarket;

/// Days of chart history requested from the feed.
pub const HISTORY_DAYS: u32 = 7;

/// Read-only market-data endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Latest traded price.
    async fn current_price(&self) -> Result<f64, SwarmError>;

    /// The most recent `limit` klines, oldest first.
    async fn klines(&self, interval: KlineInterval, limit: u32) -> Result<Vec<Kline>, SwarmError>;
}

/// Feed with a synthetic fallback.
pub struct PriceSource {
    feed: Option<Arc<dyn PriceFeed>>,
    synthetic: Mutex<SyntheticMarket>,
}

impl PriceSource {
    pub fn new(feed: Option<Arc<dyn PriceFeed>>, synthetic: SyntheticMarket) -> Self {
        Self {
            feed,
            synthetic: Mutex::new(synthetic),
        }
    }

    /// Synthetic data only.
    pub fn offline(synthetic: SyntheticMarket) -> Self {
        Self::new(None, synthetic)
    }

    /// Current price from the feed, or a synthetic one.
    pub async fn current_price(&self) -> f64 {
        if let Some(feed) = &self.feed {
            match feed.current_price().await {
                Ok(price) if price.is_finite() && price > 0.0 => return price,
                Ok(price) => warn!(price, "Feed returned an unusable price, using synthetic"),
                Err(e) => warn!(error = %e, "Current price unavailable, using synthetic"),
            }
        }
        self.synthetic_price().await
    }

    /// Seven daily closes from the feed, or a synthetic week.
    pub async fn price_history(&self) -> Vec<PricePoint> {
        if let Some(feed) = &self.feed {
            match feed.klines(KlineInterval::OneDay, HISTORY_DAYS).await {
                Ok(klines) if !klines.is_empty() => {
                    return klines.iter().map(Kline::to_price_point).collect();
                }
                Ok(_) => warn!("Feed returned no klines, using synthetic history"),
                Err(e) => warn!(error = %e, "Price history unavailable, using synthetic"),
            }
        }
        let today = Utc::now().date_naive();
        self.synthetic
            .lock()
            .await
            .price_history(today, HISTORY_DAYS)
    }

    /// Recent closes for signal generation. Unlike the other reads this
    /// reports the failure, so the caller can pick its own fallback.
    /// An empty window is not a failure: it reads as a flat trend.
    pub async fn recent_closes(
        &self,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<f64>, SwarmError> {
        let feed = self
            .feed
            .as_ref()
            .ok_or_else(|| SwarmError::FeedUnavailable("no live feed configured".into()))?;
        let klines = feed.klines(interval, limit).await?;
        debug!(interval = %interval, count = klines.len(), "Fetched kline window");
        Ok(klines.into_iter().map(|k| k.close).collect())
    }

    /// A single synthetic price, independent of the feed.
    pub async fn synthetic_price(&self) -> f64 {
        self.synthetic.lock().await.current_price()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
