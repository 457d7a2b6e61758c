//! The seam between the world and whatever proposes actions.

use std::fmt;
use std::future::Future;

use crate::action::RawDecision;
use crate::inventory::Inventory;
use crate::npc::Npc;
use crate::types::{EntityId, Location, WorldContext};

/// Another NPC as seen from the deciding NPC.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyNpc {
    /// Id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: String,
    /// Position.
    pub location: Location,
    /// Distance from the observer.
    pub distance: f64,
}

/// Everything a decision source may look at for one NPC.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// Deciding NPC.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: String,
    /// Personality sentence.
    pub personality: String,
    /// Position.
    pub location: Location,
    /// Last applied action, if any.
    pub current_task: Option<String>,
    /// Last three memories, oldest first.
    pub recent_memories: Vec<String>,
    /// Items held.
    pub inventory: Inventory,
    /// Other NPCs within perception radius.
    pub nearby: Vec<NearbyNpc>,
    /// Ambient world state.
    pub context: WorldContext,
}

impl DecisionRequest {
    /// Snapshot `npc` for a decision. `nearby` is filled in by the caller.
    #[must_use]
    pub fn snapshot(npc: &Npc, context: WorldContext) -> Self {
        Self {
            id: npc.id.clone(),
            name: npc.name.clone(),
            role: npc.role.clone(),
            personality: npc.personality.clone(),
            location: npc.location(),
            current_task: npc.current_task.clone(),
            recent_memories: npc.recent_memories(3),
            inventory: npc.inventory.clone(),
            nearby: Vec::new(),
            context,
        }
    }
}

/// Produces one proposed action per request.
///
/// Implementations return the raw payload; validation and fallback are the
/// world's job. Any `Err` counts as a failed attempt.
pub trait DecisionSource: Send + Sync + 'static {
    /// Failure type surfaced in logs.
    type Error: fmt::Display + Send;

    /// Propose an action for the NPC described by `request`.
    fn decide(
        &self,
        request: DecisionRequest,
    ) -> impl Future<Output = Result<RawDecision, Self::Error>> + Send;
}
