//! Repeating tick timer.
//!
//! Owns at most one background task. The first tick fires one full
//! period after arming; missed ticks are delayed rather than bursted.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Scheduler {
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start calling `job` every `period`. The job returns `false` to end
    /// the loop. Returns `false` (and does nothing) if already armed.
    pub fn arm<F, Fut>(&mut self, period: Duration, mut job: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        if self.is_armed() {
            debug!("Scheduler already armed");
            return false;
        }

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !job().await {
                    debug!("Scheduled job asked to stop");
                    break;
                }
            }
        });

        info!(period_secs = period.as_secs_f64(), "Scheduler armed");
        self.handle = Some(handle);
        true
    }

    /// Cancel the task. No further tick starts after this returns.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Scheduler disarmed");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
