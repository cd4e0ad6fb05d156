//! DeFiSwarm — simulated multi-agent ETH/USDT trading swarm
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the price feed into the simulation controller and serves the
//! dashboard API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use defiswarm::config;
use defiswarm::dashboard;
use defiswarm::engine::controller::SwarmController;
use defiswarm::feed::binance::BinanceClient;
use defiswarm::feed::synthetic::SyntheticMarket;
use defiswarm::feed::{PriceFeed, PriceSource};
use defiswarm::rng;

const BANNER: &str = r#"
 ____        _____ _ ____
|  _ \  ___ |  ___(_) ___|_      ____ _ _ __ _ __ ___
| | | |/ _ \| |_  | \___ \ \ /\ / / _` | '__| '_ ` _ \
| |_| |  __/|  _| | |___) \ V  V / (_| | |  | | | | | |
|____/ \___||_|   |_|____/ \_/\_/ \__,_|_|  |_| |_| |_|

  ETH/USDT multi-agent trading simulation
  v0.1.0 — no real orders are ever placed
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        tick_interval_secs = cfg.simulation.tick_interval_secs,
        base_price = cfg.simulation.base_price,
        feed_enabled = cfg.feed.enabled,
        seeded = cfg.simulation.seed.is_some(),
        "DeFiSwarm starting up"
    );

    // -- Price feed --------------------------------------------------------

    let feed: Option<Arc<dyn PriceFeed>> = if cfg.feed.enabled {
        let client = BinanceClient::new(
            Some(cfg.feed.base_url.clone()),
            Some(cfg.feed.symbol.clone()),
            cfg.feed_api_key(),
            Duration::from_secs(cfg.feed.timeout_secs),
        )?;
        info!(symbol = client.symbol(), "Live price feed configured");
        Some(Arc::new(client))
    } else {
        warn!("Price feed disabled, serving synthetic prices only");
        None
    };

    // Separate streams so the synthetic market and the agents do not
    // consume each other's draws in a seeded run.
    let market_seed = cfg.simulation.seed.map(|s| s.wrapping_add(1));
    let synthetic = SyntheticMarket::new(cfg.simulation.base_price, rng::boxed(market_seed));
    let prices = PriceSource::new(feed, synthetic);

    let controller = SwarmController::new(
        prices,
        rng::boxed(cfg.simulation.seed),
        cfg.controller_settings(),
    );

    if cfg.simulation.autostart {
        controller.start().await;
    }

    // -- Serve until shutdown ---------------------------------------------

    if cfg.server.enabled {
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        };
        dashboard::serve(controller.clone(), cfg.server.port, shutdown).await?;
    } else {
        info!("Dashboard disabled. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received.");
    }

    let metrics = controller.metrics().await;
    controller.stop().await;
    info!(
        trades = metrics.trades.total,
        successful = metrics.trades.successful,
        average_price = format!("${:.2}", metrics.average_price),
        "DeFiSwarm shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("defiswarm=info"));

    let json_logging = std::env::var("DEFISWARM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
