//! Simulation controller.
//!
//! The single entry point the HTTP layer (or any other UI) talks to.
//! Wraps the state store, the injected randomness and the scheduler
//! behind one async mutex; network reads happen outside the lock.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::engine::scheduler::Scheduler;
use crate::engine::state::{SimulationState, TickReport};
use crate::engine::{activity, analytics, executor, signal};
use crate::feed::PriceSource;
use crate::rng::RandomSource;
use crate::types::{
    Activity, AgentDecision, PricePoint, Recommendation, SimulationMetrics, SimulationStatus,
    SwarmError, TradeAction, TradeReceipt, TradeRecord,
};

/// Timing knobs. Latencies emulate a remote API for the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub tick_interval: Duration,
    pub trade_latency: Duration,
    pub activity_latency: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            trade_latency: Duration::from_millis(1200),
            activity_latency: Duration::from_millis(600),
        }
    }
}

impl ControllerSettings {
    /// No artificial latency; for tests and batch runs.
    pub fn immediate(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            trade_latency: Duration::ZERO,
            activity_latency: Duration::ZERO,
        }
    }
}

struct Core {
    state: SimulationState,
    rng: Box<dyn RandomSource>,
    scheduler: Scheduler,
}

struct Inner {
    core: Mutex<Core>,
    prices: PriceSource,
    settings: ControllerSettings,
}

/// Cheaply cloneable handle to one simulation instance.
#[derive(Clone)]
pub struct SwarmController {
    inner: Arc<Inner>,
}

impl SwarmController {
    pub fn new(
        prices: PriceSource,
        rng: Box<dyn RandomSource>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    state: SimulationState::new(),
                    rng,
                    scheduler: Scheduler::new(),
                }),
                prices,
                settings,
            }),
        }
    }

    // -- Lifecycle --------------------------------------------------------

    /// Start a run and arm the scheduler. Idempotent.
    pub async fn start(&self) -> SimulationStatus {
        let mut core = self.inner.core.lock().await;
        if core.state.is_active() {
            debug!("Start requested while already active");
            return core.state.status();
        }

        let status = core.state.start();
        let weak = Arc::downgrade(&self.inner);
        core.scheduler
            .arm(self.inner.settings.tick_interval, move || {
                scheduled_tick(weak.clone())
            });
        status
    }

    /// Stop the run and disarm the scheduler. Idempotent.
    pub async fn stop(&self) -> SimulationStatus {
        let mut core = self.inner.core.lock().await;
        core.scheduler.disarm();
        core.state.stop()
    }

    pub async fn status(&self) -> SimulationStatus {
        self.inner.core.lock().await.state.status()
    }

    pub async fn is_scheduler_armed(&self) -> bool {
        self.inner.core.lock().await.scheduler.is_armed()
    }

    // -- Ticks ------------------------------------------------------------

    /// Apply one tick with a caller-supplied price.
    pub async fn tick(&self, price: f64) -> Option<TickReport> {
        let mut core = self.inner.core.lock().await;
        let Core { state, rng, .. } = &mut *core;
        state.tick(price, rng.as_mut())
    }

    /// Fetch the current price and apply one tick. What the scheduler runs.
    pub async fn run_tick(&self) -> Option<TickReport> {
        if !self.status().await.active {
            return None;
        }
        let price = self.inner.prices.current_price().await;
        // The run may have stopped while the price was in flight; the
        // store ignores the sample in that case.
        self.tick(price).await
    }

    // -- Reads ------------------------------------------------------------

    /// The synthetic market is only drawn from while the buffer is empty.
    pub async fn metrics(&self) -> SimulationMetrics {
        let core = self.inner.core.lock().await;
        let fallback = if core.state.prices().next().is_none() {
            self.inner.prices.synthetic_price().await
        } else {
            0.0
        };
        core.state.metrics(fallback)
    }

    pub async fn current_price(&self) -> f64 {
        self.inner.prices.current_price().await
    }

    pub async fn price_history(&self) -> Vec<PricePoint> {
        self.inner.prices.price_history().await
    }

    pub async fn recommendation(&self) -> Recommendation {
        match self
            .inner
            .prices
            .recent_closes(signal::SIGNAL_INTERVAL, signal::SIGNAL_WINDOW)
            .await
        {
            Ok(closes) => {
                let price = self.inner.prices.current_price().await;
                signal::from_closes(&closes, price)
            }
            Err(e) => {
                warn!(error = %e, "Signal window unavailable, using random recommendation");
                let price = self.inner.prices.synthetic_price().await;
                let mut core = self.inner.core.lock().await;
                signal::random(core.rng.as_mut(), price)
            }
        }
    }

    pub async fn activity_log(&self) -> Vec<Activity> {
        tokio::time::sleep(self.inner.settings.activity_latency).await;
        let mut core = self.inner.core.lock().await;
        activity::generate(core.rng.as_mut(), Utc::now())
    }

    pub async fn agent_decisions(&self) -> Vec<AgentDecision> {
        let mut core = self.inner.core.lock().await;
        let Core { state, rng, .. } = &mut *core;
        let thoughts: Vec<_> = state.thoughts().cloned().collect();
        analytics::derive_decisions(&thoughts, rng.as_mut())
    }

    pub async fn trade_history(&self) -> Vec<TradeRecord> {
        let metrics = self.metrics().await;
        let mut core = self.inner.core.lock().await;
        analytics::synthesize_trade_history(&metrics, core.rng.as_mut(), Utc::now())
    }

    // -- Trades -----------------------------------------------------------

    /// Execute a simulated trade at the current price.
    pub async fn execute_trade(
        &self,
        action: TradeAction,
        amount: f64,
    ) -> Result<TradeReceipt, SwarmError> {
        executor::validate_amount(amount)?;
        tokio::time::sleep(self.inner.settings.trade_latency).await;

        let price = self.inner.prices.current_price().await;
        let mut core = self.inner.core.lock().await;
        let Core { state, rng, .. } = &mut *core;
        executor::settle(state, rng.as_mut(), action, amount, price)
    }
}

/// Body of every scheduled tick. Ends the loop once the controller is gone.
async fn scheduled_tick(inner: Weak<Inner>) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    let controller = SwarmController { inner };
    if let Some(report) = controller.run_tick().await {
        info!(
            price = format!("${:.2}", report.price),
            events = report.events_added,
            thoughts = report.thoughts_added,
            "Simulation tick"
        );
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
