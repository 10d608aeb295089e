use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::commands::Disburser;

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Runs sweeps back to back with a fixed pause measured from the end of each sweep.
pub struct Scheduler<C> {
    interval: Duration,
    clock: C,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self { interval, clock }
    }

    /// Runs until `shutdown` resolves and returns the number of finished sweeps.
    ///
    /// The first sweep starts immediately. Shutdown can interrupt a sweep in flight; the
    /// recipients completed before that point are already persisted.
    pub async fn run<F>(&self, disburser: &mut Disburser, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut finished = 0;
        loop {
            tokio::select! {
                report = disburser.sweep(finished + 1) => {
                    report.display();
                    finished += 1;
                }
                _ = &mut shutdown => break,
            }

            debug!(interval=?self.interval, "waiting for next sweep");
            tokio::select! {
                _ = self.clock.sleep(self.interval) => {}
                _ = &mut shutdown => break,
            }
        }
        info!(sweeps = finished, "===== shutting down =====");
        finished
    }
}
