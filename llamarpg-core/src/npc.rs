//! The NPC entity: identity, position, inventory, affinity, memories and
//! the per-entity timers that gate its decisions.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::inventory::Inventory;
use crate::log::BoundedLog;
use crate::roster::NpcDefinition;
use crate::social::Relationships;
use crate::types::{Activity, EntityId, Location};

/// Success-probability multipliers, one per activity, each in `[0.5, 1.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    /// Mining multiplier.
    pub mining: f64,
    /// Woodcutting multiplier.
    pub woodcutting: f64,
    /// Crafting multiplier.
    pub crafting: f64,
    /// Trading multiplier.
    pub trading: f64,
}

impl Specialization {
    /// Draw every multiplier uniformly from `[0.5, 1.0)`.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            mining: rng.gen_range(0.5..1.0),
            woodcutting: rng.gen_range(0.5..1.0),
            crafting: rng.gen_range(0.5..1.0),
            trading: rng.gen_range(0.5..1.0),
        }
    }

    /// The same multiplier for every activity, clamped into `[0.5, 1.0)`.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        let v = value.clamp(0.5, 0.999_999);
        Self {
            mining: v,
            woodcutting: v,
            crafting: v,
            trading: v,
        }
    }

    /// Multiplier for `activity`.
    #[must_use]
    pub fn for_activity(&self, activity: Activity) -> f64 {
        match activity {
            Activity::Mining => self.mining,
            Activity::Woodcutting => self.woodcutting,
            Activity::Crafting => self.crafting,
            Activity::Trading => self.trading,
        }
    }
}

/// Circuit-breaker verdict for one decision attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Decisions proceed normally.
    Closed,
    /// The failure threshold was reached just now; the pause starts.
    Tripped,
    /// Still inside the pause window.
    Paused,
}

/// A simulated NPC.
#[derive(Debug, Clone)]
pub struct Npc {
    /// Unique id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Role, e.g. "Merchant".
    pub role: String,
    /// Personality sentence.
    pub personality: String,
    location: Location,
    /// Items held.
    pub inventory: Inventory,
    /// Fixed per-activity multipliers.
    pub specialization: Specialization,
    /// Affinity towards other NPCs.
    pub relationships: Relationships,
    /// Recent stamped events, oldest evicted first.
    pub memories: BoundedLog,
    /// Description of the last applied action.
    pub current_task: Option<String>,
    /// When the last action was applied.
    pub last_action: Instant,
    /// Consecutive failed decisions.
    pub failed_attempts: u32,
    /// End of the current breaker pause, if one is running.
    pub paused_until: Option<Instant>,
}

impl Npc {
    /// Create an NPC at a known position with known multipliers.
    #[must_use]
    pub fn new(
        def: &NpcDefinition,
        location: Location,
        specialization: Specialization,
        memory_capacity: usize,
        now: Instant,
    ) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            role: def.role.clone(),
            personality: def.personality.clone(),
            location: location.clamped(),
            inventory: Inventory::new(),
            specialization,
            relationships: Relationships::new(),
            memories: BoundedLog::new(memory_capacity),
            current_task: None,
            last_action: now,
            failed_attempts: 0,
            paused_until: None,
        }
    }

    /// Create an NPC at a random position with random multipliers.
    pub fn spawn(def: &NpcDefinition, memory_capacity: usize, now: Instant, rng: &mut impl Rng) -> Self {
        let location = Location::random(rng);
        let specialization = Specialization::random(rng);
        Self::new(def, location, specialization, memory_capacity, now)
    }

    /// Current position.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Teleport to `location`, clamped into the map.
    pub fn set_location(&mut self, location: Location) {
        self.location = location.clamped();
    }

    /// Distance to another NPC.
    #[must_use]
    pub fn distance_to(&self, other: &Npc) -> f64 {
        self.location.distance(&other.location)
    }

    /// Step towards `target` by at most `speed` along the straight line.
    ///
    /// The target is clamped into the map first, and the resulting position
    /// never leaves it. Non-finite targets leave the NPC where it is and
    /// return `false`.
    pub fn move_towards(&mut self, target: Location, speed: f64) -> bool {
        if !(target.x.is_finite() && target.y.is_finite()) {
            return false;
        }
        let target = target.clamped();
        let dx = target.x - self.location.x;
        let dy = target.y - self.location.y;
        let distance = dx.hypot(dy);
        self.location = if distance <= speed {
            target
        } else {
            let ratio = speed / distance;
            Location {
                x: self.location.x + dx * ratio,
                y: self.location.y + dy * ratio,
            }
            .clamped()
        };
        true
    }

    /// Add items and remember the acquisition.
    pub fn add_item(&mut self, item: &str, quantity: u32) {
        self.inventory.add(item, quantity);
        self.remember(&format!("Acquired {quantity}x {item}"));
    }

    /// Remove items and remember the use. Returns `false` if not enough are held.
    pub fn remove_item(&mut self, item: &str, quantity: u32) -> bool {
        if !self.inventory.remove(item, quantity) {
            return false;
        }
        self.remember(&format!("Used {quantity}x {item}"));
        true
    }

    /// Record a stamped memory.
    pub fn remember(&mut self, event: &str) {
        self.memories.push_stamped(event);
    }

    /// Last `n` memories, oldest first.
    #[must_use]
    pub fn recent_memories(&self, n: usize) -> Vec<String> {
        self.memories.recent(n)
    }

    /// Shift affinity towards `other`.
    pub fn adjust_relationship(&mut self, other: &EntityId, delta: i32, default: u8) -> u8 {
        self.relationships.adjust(other, delta, default)
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Whether at least `interval` has passed since the last action.
    #[must_use]
    pub fn decision_due(&self, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(self.last_action) >= interval
    }

    /// Whether the action cooldown has elapsed.
    #[must_use]
    pub fn action_ready(&self, now: Instant, cooldown: Duration) -> bool {
        now.saturating_duration_since(self.last_action) >= cooldown
    }

    /// Evaluate the failure breaker at the start of a decision.
    ///
    /// Once `threshold` consecutive failures accumulate the NPC sits out for
    /// `pause`; when the pause has elapsed the counter resets and decisions
    /// resume.
    pub fn breaker_gate(&mut self, now: Instant, threshold: u32, pause: Duration) -> BreakerState {
        if self.failed_attempts < threshold {
            return BreakerState::Closed;
        }
        match self.paused_until {
            None => {
                self.paused_until = Some(now + pause);
                BreakerState::Tripped
            }
            Some(until) if now < until => BreakerState::Paused,
            Some(_) => {
                self.failed_attempts = 0;
                self.paused_until = None;
                BreakerState::Closed
            }
        }
    }

    /// Record the outcome of a decision attempt.
    pub fn record_decision(&mut self, success: bool) {
        if success {
            self.failed_attempts = 0;
        } else {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
        }
    }
}
