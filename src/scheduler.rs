//! Periodic, per-target collection.
//!
//! Every target ticks on its own `tokio::time::interval`. Each tick spawns
//! one run, so a slow target never delays its own ticker or any other
//! target. A target never has more than one run in flight.
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::Fetch;
use crate::collector::{CollectionTarget, Collector};
use crate::error::ResultOkLogExt;
use crate::session::{Authenticator, SessionCache};

pub struct Scheduler<A, F> {
    session: Arc<SessionCache<A>>,
    collector: Arc<Collector<F>>,
    interval: Duration,
    in_flight: Arc<DashSet<CollectionTarget>>,
}

impl<A, F> Clone for Scheduler<A, F> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            collector: Arc::clone(&self.collector),
            interval: self.interval,
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A, F> Scheduler<A, F>
where
    A: Authenticator + 'static,
    F: Fetch + 'static,
{
    pub fn new(
        session: Arc<SessionCache<A>>,
        collector: Arc<Collector<F>>,
        interval: Duration,
    ) -> Self {
        Self {
            session,
            collector,
            interval,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Spawns one ticker per target; the first tick fires immediately.
    pub fn start(&self, targets: &[CollectionTarget]) -> Vec<JoinHandle<()>> {
        targets
            .iter()
            .map(|&target| {
                let scheduler = self.clone();
                tokio::spawn(async move { scheduler.tick(target).await })
            })
            .collect()
    }

    async fn tick(self, target: CollectionTarget) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Collecting {target} every {:?}", self.interval);
        loop {
            interval.tick().await;
            let Some(guard) = InFlight::acquire(&self.in_flight, target) else {
                log::warn!("Skipping {target} tick, previous run is still in progress");
                continue;
            };
            let scheduler = self.clone();
            tokio::spawn(async move {
                let _guard = guard;
                scheduler.run_once(target).await;
            });
        }
    }

    /// Runs `target` once with the cached credential; `true` on success.
    ///
    /// Failures end here: they are logged and reflected in the collector
    /// health gauges. A 401 drops the credential so the next run logs in again.
    pub async fn run_once(&self, target: CollectionTarget) -> bool {
        let credential = match self.session.credential().await {
            Ok(credential) => credential,
            Err(err) => {
                log::warn!("Skipping {target}, panel login failed: {err}");
                self.collector.record_skipped(target);
                return false;
            }
        };

        let outcome = self.collector.run(target, &credential).await;
        if outcome.as_ref().is_err_and(|err| err.is_unauthorized()) {
            self.session.invalidate(&credential).await;
        }
        outcome
            .ok_log(&format!("Failed to collect {target}"))
            .is_some()
    }
}

/// Marks a target as running until dropped.
struct InFlight {
    running: Arc<DashSet<CollectionTarget>>,
    target: CollectionTarget,
}

impl InFlight {
    fn acquire(running: &Arc<DashSet<CollectionTarget>>, target: CollectionTarget) -> Option<Self> {
        running.insert(target).then(|| Self {
            running: Arc::clone(running),
            target,
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.running.remove(&self.target);
    }
}
