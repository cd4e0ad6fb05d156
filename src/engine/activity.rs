//! Synthetic activity feed.
//!
//! An independent stream of plausible dashboard notices. It shares
//! nothing with the simulation's market-event list.

use chrono::{DateTime, Duration, Utc};

use crate::rng::RandomSource;
use crate::types::{Activity, ActivityKind, Impact};

pub const ACTIVITY_COUNT: usize = 15;
/// Activities are spread over this many days before `now`.
pub const LOOKBACK_DAYS: i64 = 7;

const MESSAGES: &[&str] = &[
    "ETH price crossed above 3600 resistance level",
    "Bullish divergence detected on 4H chart",
    "Volume increase detected with price rise",
    "BUY signal triggered at $3550",
    "SELL signal triggered at $3680",
    "RSI indicates overbought conditions",
    "50 MA crossed above 200 MA",
    "System detected volatility increase",
    "ETH price support level established at $3500",
];

/// Generate the feed as of `now`, newest first.
pub fn generate(rng: &mut dyn RandomSource, now: DateTime<Utc>) -> Vec<Activity> {
    let window_ms = Duration::days(LOOKBACK_DAYS).num_milliseconds() as f64;

    let mut activities: Vec<Activity> = (0..ACTIVITY_COUNT)
        .map(|i| {
            let back = Duration::milliseconds(rng.uniform(0.0, window_ms) as i64);
            let kind = ActivityKind::ALL[rng.index(ActivityKind::ALL.len())];
            let message = MESSAGES[rng.index(MESSAGES.len())];
            let impact = if rng.chance(0.5) {
                Impact::High
            } else {
                Impact::Medium
            };
            Activity {
                id: format!("activity-{i}"),
                timestamp: now - back,
                kind,
                message: message.to_string(),
                impact,
            }
        })
        .collect();

    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities
}
