//! One world tick: every due NPC decides and acts, concurrently.
//!
//! Each NPC update runs as its own task. The tick waits for all of them
//! before returning, so a tick is a barrier. A panicking update is caught
//! at join time and logged as a failure for that NPC alone.

use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::action::{Decision, RawDecision};
use crate::decision::{DecisionRequest, DecisionSource};
use crate::executor::Execution;
use crate::heuristic;
use crate::npc::BreakerState;
use crate::types::WorldContext;
use crate::world::World;

/// Result of one NPC's update within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The decision interval had not elapsed.
    NotDue,
    /// The failure breaker is holding the NPC out.
    Paused,
    /// A decision from the source was applied.
    Decided(Execution),
    /// The source failed and the fallback was applied.
    Fallback(Execution),
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// NPCs whose decision interval had not elapsed.
    pub not_due: usize,
    /// NPCs held out by the breaker.
    pub paused: usize,
    /// NPCs that acted on the source's decision.
    pub decided: usize,
    /// NPCs that acted on the fallback.
    pub fallbacks: usize,
    /// Updates that panicked.
    pub crashed: usize,
}

impl TickReport {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::NotDue => self.not_due += 1,
            UpdateOutcome::Paused => self.paused += 1,
            UpdateOutcome::Decided(_) => self.decided += 1,
            UpdateOutcome::Fallback(_) => self.fallbacks += 1,
        }
    }
}

impl World {
    /// Run one tick: update every NPC concurrently and wait for all of them.
    pub async fn tick<D: DecisionSource>(self: &Arc<Self>, source: &Arc<D>, context: WorldContext) -> TickReport {
        let now = Instant::now();
        let handles: Vec<_> = (0..self.len())
            .map(|slot| {
                let world = Arc::clone(self);
                let source = Arc::clone(source);
                let rng = self.fork_rng();
                let handle = tokio::spawn(async move {
                    world.update_slot(slot, source.as_ref(), context, now, rng).await
                });
                (slot, handle)
            })
            .collect();

        let mut report = TickReport::default();
        for (slot, handle) in handles {
            match handle.await {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    report.crashed += 1;
                    let name = self.name_at(slot);
                    warn!(npc = %self.id_at(slot), error = %err, "NPC update crashed");
                    self.log_event(&format!("{name} failed to update (Error occurred)"));
                }
            }
        }
        debug!(?report, "tick complete");
        report
    }

    /// Update a single NPC by id, outside of a full tick.
    ///
    /// Returns `None` if `id` is not registered.
    pub async fn update_npc<D: DecisionSource>(
        &self,
        id: &str,
        source: &D,
        context: WorldContext,
        now: Instant,
    ) -> Option<UpdateOutcome> {
        let slot = self.slot_of(id)?;
        let rng = self.fork_rng();
        Some(self.update_slot(slot, source, context, now, rng).await)
    }

    async fn update_slot<D: DecisionSource>(
        &self,
        slot: usize,
        source: &D,
        context: WorldContext,
        now: Instant,
        mut rng: StdRng,
    ) -> UpdateOutcome {
        let config = self.config();
        let (gate, request) = {
            let mut npc = self.lock_slot(slot);
            if !npc.decision_due(now, config.world.decision_interval()) {
                return UpdateOutcome::NotDue;
            }
            let gate = npc.breaker_gate(now, config.breaker.failure_threshold, config.breaker.pause());
            (gate, DecisionRequest::snapshot(&npc, context))
        };

        match gate {
            BreakerState::Closed => {}
            BreakerState::Tripped => {
                info!(
                    npc = %self.id_at(slot),
                    pause_ms = config.breaker.pause_ms,
                    "{} is taking a break due to too many failed attempts",
                    self.name_at(slot)
                );
                return UpdateOutcome::Paused;
            }
            BreakerState::Paused => return UpdateOutcome::Paused,
        }

        let mut request = request;
        request.nearby = self.perceive(slot, &request.location, config.world.perception_radius);
        let location = request.location;

        let asked_at = Instant::now();
        let decided = self.resolve(slot, source, request).await;
        // The action happens after the decision returns, not when the tick started.
        let acted_at = now + asked_at.elapsed();
        self.lock_slot(slot).record_decision(decided.is_some());

        let (decision, from_source) = match decided {
            Some(decision) => (decision, true),
            None => (
                heuristic::default_decision(&location, config.world.edge_margin, &mut rng),
                false,
            ),
        };

        let execution = match self.execute(self.id_at(slot).as_str(), &decision, acted_at, &mut rng) {
            Ok(execution) => execution,
            Err(err) => {
                warn!(npc = %self.id_at(slot), error = %err, "execution rejected");
                Execution::Failed
            }
        };
        if from_source {
            UpdateOutcome::Decided(execution)
        } else {
            UpdateOutcome::Fallback(execution)
        }
    }

    /// Ask the source, bounded by the request timeout, and validate the answer.
    /// `None` means the attempt failed and the fallback applies.
    async fn resolve<D: DecisionSource>(&self, slot: usize, source: &D, request: DecisionRequest) -> Option<Decision> {
        let timeout = self.config().llm.request_timeout();
        let raw: RawDecision = match tokio::time::timeout(timeout, source.decide(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                warn!(npc = %self.id_at(slot), error = %err, "decision source failed, falling back");
                return None;
            }
            Err(_) => {
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = timeout.as_millis() as u64;
                warn!(npc = %self.id_at(slot), timeout_ms, "decision timed out, falling back");
                return None;
            }
        };
        match raw.validate() {
            Ok(decision) => Some(decision),
            Err(err) => {
                warn!(npc = %self.id_at(slot), error = %err, ?raw, "invalid decision, falling back");
                None
            }
        }
    }
}
