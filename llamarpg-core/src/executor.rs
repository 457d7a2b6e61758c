//! Applies validated actions to the world.
//!
//! Every applied action leaves at least one event-log line. Failures inside
//! a branch are caught here, logged as a generic failure for the NPC and
//! action, and never propagate into the tick.

use rand::Rng;
use rand::seq::SliceRandom;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::action::{Action, Decision};
use crate::error::{Result, SimError};
use crate::roster;
use crate::types::{Activity, EntityId, Location};
use crate::world::World;

/// What happened to a submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// The action cooldown had not elapsed; nothing changed and nothing was logged.
    Skipped,
    /// The action ran (successfully or with a logged, expected failure).
    Applied,
    /// The action hit an unexpected error and was logged as a generic failure.
    Failed,
}

impl World {
    /// Apply `decision` on behalf of `actor`.
    ///
    /// # Errors
    /// Returns `SimError::EntityNotFound` only when `actor` itself is not
    /// registered; everything else is absorbed and logged.
    pub fn execute(
        &self,
        actor: &str,
        decision: &Decision,
        now: Instant,
        rng: &mut impl Rng,
    ) -> Result<Execution> {
        let slot = self
            .slot_of(actor)
            .ok_or_else(|| SimError::EntityNotFound(EntityId::new(actor)))?;

        if !self
            .lock_slot(slot)
            .action_ready(now, self.config().world.action_cooldown())
        {
            debug!(npc = %actor, "action skipped, cooldown active");
            return Ok(Execution::Skipped);
        }

        let outcome = match self.apply(slot, decision, rng) {
            Ok(()) => Execution::Applied,
            Err(err) => {
                let kind = decision.action.kind();
                warn!(npc = %actor, action = %kind, error = %err, "action failed");
                self.log_event(&format!("{} failed to {kind} (Error occurred)", self.name_at(slot)));
                Execution::Failed
            }
        };

        let mut npc = self.lock_slot(slot);
        npc.last_action = now;
        if outcome == Execution::Applied {
            npc.current_task = Some(decision.action.to_string());
        }
        Ok(outcome)
    }

    fn apply(&self, slot: usize, decision: &Decision, rng: &mut impl Rng) -> Result<()> {
        let reason = decision.reason.as_str();
        match &decision.action {
            Action::Mine { resource } => {
                self.gather(slot, Activity::Mining, resource, reason, rng);
                Ok(())
            }
            Action::Woodcut { resource } => {
                self.gather(slot, Activity::Woodcutting, resource, reason, rng);
                Ok(())
            }
            Action::Move { x, y } => {
                self.walk(slot, *x, *y, reason);
                Ok(())
            }
            Action::Trade { partner } => self.trade(slot, partner, reason, rng),
            Action::Chat { partner } => self.chat(slot, partner, reason),
        }
    }

    fn gather(&self, slot: usize, activity: Activity, resource: &str, reason: &str, rng: &mut impl Rng) {
        let (verb, past) = match activity {
            Activity::Mining => ("mine", "mined"),
            _ => ("cut", "cut"),
        };
        let name = self.name_at(slot);
        if roster::lookup(activity, resource).is_none() {
            self.log_event(&format!("{name} tried to {verb} invalid resource: {resource}"));
            return;
        }

        let mut npc = self.lock_slot(slot);
        let chance = npc.specialization.for_activity(activity);
        if rng.gen_range(0.0..1.0) < chance {
            let quantity = rng.gen_range(1..=2);
            npc.add_item(resource, quantity);
            drop(npc);
            self.log_event(&format!("{name} successfully {past} {quantity}x {resource} ({reason})"));
        } else {
            drop(npc);
            self.log_event(&format!("{name} failed to {verb} {resource} ({reason})"));
        }
    }

    fn walk(&self, slot: usize, x: f64, y: f64, reason: &str) {
        let name = self.name_at(slot);
        let speed = self.config().world.move_speed;
        let mut npc = self.lock_slot(slot);
        let before = npc.location();
        if !npc.move_towards(Location { x, y }, speed) {
            drop(npc);
            self.log_event(&format!("{name} failed to move (Invalid coordinates)"));
            return;
        }
        let after = npc.location();
        drop(npc);
        if before.cell() != after.cell() {
            self.log_event(&format!("{name} moved from {before} to {after} ({reason})"));
        }
    }

    fn trade(&self, slot: usize, partner: &EntityId, reason: &str, rng: &mut impl Rng) -> Result<()> {
        let name = self.name_at(slot);
        let Some(other) = self.slot_of(partner.as_str()) else {
            self.log_event(&format!("{name} couldn't find trading partner {partner}"));
            return Ok(());
        };
        if other == slot {
            return Err(SimError::SelfInteraction(partner.clone()));
        }
        let other_name = self.name_at(other);
        let range = self.config().world.interaction_range;
        let social = &self.config().social;

        let (mut a, mut b) = self.lock_pair(slot, other);
        if a.distance_to(&b) > range {
            drop((a, b));
            self.log_event(&format!("{name} is too far from {other_name} to trade"));
            return Ok(());
        }

        let offer = a.inventory.surplus().choose(rng).map(|s| (*s).to_string());
        let ask = b.inventory.surplus().choose(rng).map(|s| (*s).to_string());
        let (Some(offer), Some(ask)) = (offer, ask) else {
            drop((a, b));
            self.log_event(&format!("{name} couldn't find suitable trade with {other_name}"));
            return Ok(());
        };

        a.remove_item(&offer, 1);
        b.remove_item(&ask, 1);
        a.add_item(&ask, 1);
        b.add_item(&offer, 1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        a.adjust_relationship(&b_id, social.trade_bonus, social.default_affinity);
        b.adjust_relationship(&a_id, social.trade_bonus, social.default_affinity);
        drop((a, b));

        self.log_event(&format!("{name} traded {offer} for {ask} with {other_name} ({reason})"));
        Ok(())
    }

    fn chat(&self, slot: usize, partner: &EntityId, message: &str) -> Result<()> {
        let name = self.name_at(slot);
        let Some(other) = self.slot_of(partner.as_str()) else {
            self.log_event(&format!("{name} tried to chat with non-existent NPC {partner}"));
            return Ok(());
        };
        if other == slot {
            return Err(SimError::SelfInteraction(partner.clone()));
        }
        let other_name = self.name_at(other);
        let range = self.config().world.interaction_range;
        let social = &self.config().social;

        let (mut a, mut b) = self.lock_pair(slot, other);
        if a.distance_to(&b) > range {
            drop((a, b));
            self.log_event(&format!("{name} is too far from {other_name} to chat"));
            return Ok(());
        }
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        a.adjust_relationship(&b_id, social.chat_bonus, social.default_affinity);
        b.adjust_relationship(&a_id, social.chat_bonus, social.default_affinity);
        drop((a, b));

        self.log_event(&format!("{name} chats with {other_name}: \"{message}\""));
        Ok(())
    }
}
