//! The real-time tick driver.
//!
//! Ticks the world on a fixed cadence until the shutdown flag flips. Time of
//! day is recomputed from the local clock before every tick. A tick that
//! overruns the cadence delays the next one instead of bunching up.

use std::sync::Arc;
use std::time::Duration;

use llamarpg_core::decision::DecisionSource;
use llamarpg_core::{World, WorldContext};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Drives [`World::tick`] until told to stop.
pub struct Runner<D> {
    world: Arc<World>,
    source: Arc<D>,
    period: Duration,
    context: fn() -> WorldContext,
}

impl<D: DecisionSource> Runner<D> {
    /// Runner ticking at the world's configured interval.
    #[must_use]
    pub fn new(world: Arc<World>, source: Arc<D>) -> Self {
        let period = world.config().world.tick_interval();
        Self {
            world,
            source,
            period,
            context: WorldContext::now,
        }
    }

    /// Replace the wall-clock context with a fixed one.
    #[must_use]
    pub fn with_context(mut self, context: fn() -> WorldContext) -> Self {
        self.context = context;
        self
    }

    /// Tick until `shutdown` becomes `true` or its sender is dropped.
    /// Returns the number of completed ticks.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;
        info!(period_ms = self.period.as_millis(), npcs = self.world.len(), "simulation started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let report = self.world.tick(&self.source, (self.context)()).await;
                    ticks += 1;
                    debug!(tick = ticks, ?report, "tick");
                }
            }
        }

        info!(ticks, "simulation stopped");
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamarpg_core::config::SimConfig;
    use llamarpg_core::decision::DecisionRequest;
    use llamarpg_core::RawDecision;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl DecisionSource for Counter {
        type Error = String;

        async fn decide(&self, _request: DecisionRequest) -> Result<RawDecision, String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(RawDecision::new("mine", "copper_ore", "steady work"))
        }
    }

    fn night() -> WorldContext {
        WorldContext {
            time_of_day: llamarpg_core::TimeOfDay::Night,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_shutdown() {
        let world = Arc::new(World::new(SimConfig::default(), Some(3)).expect("world"));
        let source = Arc::new(Counter(AtomicUsize::new(0)));
        let (tx, rx) = watch::channel(false);
        let runner = Runner::new(Arc::clone(&world), Arc::clone(&source)).with_context(night);
        let handle = tokio::spawn(runner.run(rx));

        // First tick fires immediately; decisions become due after 3s.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(source.0.load(Ordering::SeqCst), world.len());

        tx.send(true).expect("runner alive");
        let ticks = handle.await.expect("runner joins");
        assert!((4..=5).contains(&ticks), "ran {ticks} ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_stops_the_loop() {
        let world = Arc::new(World::new(SimConfig::default(), Some(3)).expect("world"));
        let source = Arc::new(Counter(AtomicUsize::new(0)));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(Runner::new(world, source).run(rx));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(tx);
        assert!(handle.await.expect("runner joins") >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn already_stopped_runs_nothing() {
        let world = Arc::new(World::new(SimConfig::default(), Some(3)).expect("world"));
        let (_tx, rx) = watch::channel(true);
        let ticks = Runner::new(world, Arc::new(Counter(AtomicUsize::new(0)))).run(rx).await;
        assert_eq!(ticks, 0);
    }
}
