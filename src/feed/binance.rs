//! Binance public market-data integration.
//!
//! Read-only: only the ticker and kline endpoints are used, and only
//! the close price and open time of each kline.
//!
//! Ticker: `GET /api/v3/ticker/price?symbol=ETHUSDT` → `{"symbol":…,"price":"3601.23"}`
//! Klines: `GET /api/v3/klines?symbol=ETHUSDT&interval=1d&limit=7` →
//! `[[openTime, open, high, low, close, volume, closeTime, …], …]`
//! Auth: none required; an optional `X-MBX-APIKEY` header is sent if configured.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::PriceFeed;
use crate::types::{Kline, KlineInterval, SwarmError};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_SYMBOL: &str = "ETHUSDT";

const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Index of the close price inside a kline array.
const CLOSE_INDEX: usize = 4;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct BinanceClient {
    http: Client,
    base_url: String,
    symbol: String,
    api_key: Option<SecretString>,
}

impl BinanceClient {
    pub fn new(
        base_url: Option<String>,
        symbol: Option<String>,
        api_key: Option<SecretString>,
        timeout: std::time::Duration,
    ) -> Result<Self, SwarmError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("DeFiSwarm/0.1.0 (trading-simulation)")
            .build()
            .map_err(|e| SwarmError::FeedUnavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            symbol: symbol.unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            api_key,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SwarmError> {
        debug!(url = %url, "Fetching Binance endpoint");

        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key.expose_secret().as_str());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SwarmError::FeedUnavailable(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SwarmError::FeedUnavailable(format!(
                "Binance API error {status}: {body}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| SwarmError::FeedUnavailable(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl PriceFeed for BinanceClient {
    async fn current_price(&self) -> Result<f64, SwarmError> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}",
            self.base_url,
            urlencoding::encode(&self.symbol)
        );
        let ticker: TickerPrice = self.get_json(&url).await?;
        parse_price(&ticker.price)
    }

    async fn klines(&self, interval: KlineInterval, limit: u32) -> Result<Vec<Kline>, SwarmError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            urlencoding::encode(&self.symbol),
            interval.as_str(),
            limit
        );
        let rows: Vec<Vec<Value>> = self.get_json(&url).await?;
        parse_klines(&rows)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_price(raw: &str) -> Result<f64, SwarmError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| SwarmError::FeedUnavailable(format!("invalid price: {raw:?}")))
}

/// Reduce raw kline rows to open time and close price.
pub fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Kline>, SwarmError> {
    rows.iter()
        .map(|row| {
            let open_ms = row
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| SwarmError::FeedUnavailable("kline missing open time".into()))?;
            let open_time = Utc
                .timestamp_millis_opt(open_ms)
                .single()
                .ok_or_else(|| SwarmError::FeedUnavailable(format!("bad open time {open_ms}")))?;

            let close = match row.get(CLOSE_INDEX) {
                Some(Value::String(s)) => parse_price(s)?,
                Some(Value::Number(n)) => n
                    .as_f64()
                    .ok_or_else(|| SwarmError::FeedUnavailable("bad close price".into()))?,
                _ => return Err(SwarmError::FeedUnavailable("kline missing close".into())),
            };

            Ok(Kline { open_time, close })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
