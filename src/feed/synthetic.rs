//! Synthetic market data.
//!
//! Stands in for the live feed whenever it is disabled or failing.
//! Prices hover around a configurable base (ETH ≈ $3600 by default).

use chrono::{Duration, NaiveDate};

use crate::rng::RandomSource;
use crate::types::{round_cents, PricePoint};

/// Half-width of the current-price band around the base (±0.5%).
const PRICE_BAND: f64 = 0.005;

/// Offset of the synthetic history's opening price below the base.
const HISTORY_OPEN_DISCOUNT: f64 = 100.0;

/// Synthetic price generator.
pub struct SyntheticMarket {
    base_price: f64,
    rng: Box<dyn RandomSource>,
}

impl SyntheticMarket {
    pub fn new(base_price: f64, rng: Box<dyn RandomSource>) -> Self {
        Self { base_price, rng }
    }

    /// `base × U(0.995, 1.005)`, rounded to cents.
    pub fn current_price(&mut self) -> f64 {
        let factor = self.rng.uniform(1.0 - PRICE_BAND, 1.0 + PRICE_BAND);
        round_cents(self.base_price * factor)
    }

    /// `days` daily closes ending on `today`, oldest first.
    ///
    /// Opens at `base − 100 + U(0, 100)` and multiplies each day by
    /// `U(0.99, 1.03)`.
    pub fn price_history(&mut self, today: NaiveDate, days: u32) -> Vec<PricePoint> {
        let mut price = self.base_price - HISTORY_OPEN_DISCOUNT
            + self.rng.uniform(0.0, HISTORY_OPEN_DISCOUNT);

        (0..days)
            .rev()
            .map(|back| {
                price *= self.rng.uniform(0.99, 1.03);
                let date = today - Duration::days(i64::from(back));
                PricePoint {
                    date: date.format("%Y-%m-%d").to_string(),
                    price: round_cents(price),
                }
            })
            .collect()
    }
}
