//! Injectable sources of timer ticks.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::config::MIN_TICK_INTERVAL;

/// Produces the ticks that advance a session's countdown.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick. Pends forever once the source is exhausted.
    async fn next_tick(&mut self);

    /// Restart the cadence, e.g. when a new attempt begins running.
    fn reset(&mut self) {}
}

/// Wall-clock ticks from a tokio interval.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// The first tick arrives one `period` after creation (or after `reset`).
    /// A zero period is raised to `MIN_TICK_INTERVAL`.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_TICK_INTERVAL);
        let mut interval = interval_at(Instant::now() + period, period);
        // A stalled runtime must not replay a burst of seconds.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }

    fn reset(&mut self) {
        self.interval.reset();
    }
}

/// Ticks pushed by hand through a `ManualTickHandle`.
#[derive(Debug)]
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sending side of `ManualTicks`.
#[derive(Debug, Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    #[must_use]
    pub fn channel() -> (Self, ManualTickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualTickHandle { tx })
    }
}

impl ManualTickHandle {
    /// Queue one tick. Returns false if the source has been dropped.
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    /// Queue `n` ticks.
    pub fn advance(&self, n: u32) -> bool {
        (0..n).all(|_| self.tick())
    }
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
