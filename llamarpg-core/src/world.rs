//! The world registry: owns every NPC and the shared event log.
//!
//! Each NPC sits behind its own mutex so per-tick updates for different
//! NPCs run in parallel. Membership is fixed at construction. Code that
//! needs two NPCs at once goes through [`World::lock_pair`], which always
//! locks the lower id first.

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::info;

use crate::config::SimConfig;
use crate::decision::NearbyNpc;
use crate::error::{Result, SimError};
use crate::inventory::Inventory;
use crate::log::BoundedLog;
use crate::npc::{Npc, Specialization};
use crate::types::{EntityId, Location};

/// Read-only status line for one NPC.
#[derive(Debug, Clone)]
pub struct NpcStatus {
    /// Id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: String,
    /// Position.
    pub location: Location,
    /// Items held.
    pub inventory: Inventory,
    /// Last applied action, if any.
    pub current_task: Option<String>,
    /// Per-activity multipliers.
    pub specialization: Specialization,
    /// `"Name: N%"` for every recorded relationship.
    pub relationships: Vec<String>,
}

/// Owns the NPCs and the event log.
pub struct World {
    config: SimConfig,
    ids: Vec<EntityId>,
    names: Vec<String>,
    npcs: Vec<Mutex<Npc>>,
    index: HashMap<EntityId, usize>,
    events: Mutex<BoundedLog>,
    rng: Mutex<StdRng>,
}

impl World {
    /// Spawn the configured roster at random positions.
    ///
    /// # Errors
    /// Returns `SimError::DuplicateEntity` if two roster entries share an id.
    pub fn new(config: SimConfig, seed: Option<u64>) -> Result<Self> {
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let now = Instant::now();
        let capacity = config.world.memory_capacity;
        let npcs = config
            .roster()
            .iter()
            .map(|def| Npc::spawn(def, capacity, now, &mut rng))
            .collect();
        Self::assemble(config, npcs, rng)
    }

    /// Build a world from pre-made NPCs, keeping their order.
    ///
    /// # Errors
    /// Returns `SimError::DuplicateEntity` if two NPCs share an id.
    pub fn from_npcs(config: SimConfig, npcs: Vec<Npc>, seed: u64) -> Result<Self> {
        Self::assemble(config, npcs, StdRng::seed_from_u64(seed))
    }

    fn assemble(config: SimConfig, npcs: Vec<Npc>, rng: StdRng) -> Result<Self> {
        let mut index = HashMap::with_capacity(npcs.len());
        for (slot, npc) in npcs.iter().enumerate() {
            if index.insert(npc.id.clone(), slot).is_some() {
                return Err(SimError::DuplicateEntity(npc.id.clone()));
            }
        }
        let events = BoundedLog::new(config.world.event_log_capacity);
        Ok(Self {
            ids: npcs.iter().map(|n| n.id.clone()).collect(),
            names: npcs.iter().map(|n| n.name.clone()).collect(),
            npcs: npcs.into_iter().map(Mutex::new).collect(),
            index,
            events: Mutex::new(events),
            rng: Mutex::new(rng),
            config,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of NPCs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    /// Whether the world has no NPCs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// Ids in roster order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Display name of a registered NPC.
    #[must_use]
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&slot| self.names[slot].as_str())
    }

    /// A snapshot copy of one NPC.
    #[must_use]
    pub fn npc(&self, id: &str) -> Option<Npc> {
        self.index.get(id).map(|&slot| self.npcs[slot].lock().clone())
    }

    /// Snapshot copies of every NPC in roster order.
    #[must_use]
    pub fn npcs(&self) -> Vec<Npc> {
        self.npcs.iter().map(|n| n.lock().clone()).collect()
    }

    /// Run `f` with exclusive access to one NPC.
    pub fn with_npc<R>(&self, id: &str, f: impl FnOnce(&mut Npc) -> R) -> Option<R> {
        let &slot = self.index.get(id)?;
        Some(f(&mut self.npcs[slot].lock()))
    }

    pub(crate) fn slot_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn lock_slot(&self, slot: usize) -> MutexGuard<'_, Npc> {
        self.npcs[slot].lock()
    }

    pub(crate) fn name_at(&self, slot: usize) -> &str {
        &self.names[slot]
    }

    pub(crate) fn id_at(&self, slot: usize) -> &EntityId {
        &self.ids[slot]
    }

    /// Lock two distinct NPCs, lower id first, returning the guards in
    /// argument order.
    pub(crate) fn lock_pair(&self, a: usize, b: usize) -> (MutexGuard<'_, Npc>, MutexGuard<'_, Npc>) {
        debug_assert_ne!(a, b, "lock_pair needs two distinct NPCs");
        if self.ids[a] <= self.ids[b] {
            let first = self.npcs[a].lock();
            let second = self.npcs[b].lock();
            (first, second)
        } else {
            let second = self.npcs[b].lock();
            let first = self.npcs[a].lock();
            (first, second)
        }
    }

    /// Fresh RNG for one NPC update, drawn from the world's seeded stream.
    pub(crate) fn fork_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().r#gen())
    }

    // -----------------------------------------------------------------------
    // Event log
    // -----------------------------------------------------------------------

    /// Append a stamped line to the event log and mirror it to tracing.
    pub fn log_event(&self, line: &str) {
        let stamped = self.events.lock().push_stamped(line);
        info!(target: "llamarpg::events", "{stamped}");
    }

    /// Last `n` event lines, oldest first.
    #[must_use]
    pub fn recent_events(&self, n: usize) -> Vec<String> {
        self.events.lock().recent(n)
    }

    /// Number of lines currently in the event log.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Status of every NPC in roster order.
    #[must_use]
    pub fn status(&self) -> Vec<NpcStatus> {
        self.npcs
            .iter()
            .map(|cell| {
                let npc = cell.lock();
                let relationships = npc
                    .relationships
                    .iter()
                    .map(|(other, score)| {
                        let name = self.name_of(other.as_str()).unwrap_or(other.as_str());
                        format!("{name}: {score}%")
                    })
                    .collect();
                NpcStatus {
                    id: npc.id.clone(),
                    name: npc.name.clone(),
                    role: npc.role.clone(),
                    location: npc.location(),
                    inventory: npc.inventory.clone(),
                    current_task: npc.current_task.clone(),
                    specialization: npc.specialization,
                    relationships,
                }
            })
            .collect()
    }

    /// Every NPC within `radius` (inclusive) of `location`, nearest first.
    #[must_use]
    pub fn nearby(&self, location: &Location, radius: f64) -> Vec<NearbyNpc> {
        let mut found: Vec<NearbyNpc> = self
            .npcs
            .iter()
            .filter_map(|cell| {
                let npc = cell.lock();
                let distance = npc.location().distance(location);
                (distance <= radius).then(|| NearbyNpc {
                    id: npc.id.clone(),
                    name: npc.name.clone(),
                    role: npc.role.clone(),
                    location: npc.location(),
                    distance,
                })
            })
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    /// Other NPCs strictly within `radius` of the NPC in `slot`.
    pub(crate) fn perceive(&self, slot: usize, location: &Location, radius: f64) -> Vec<NearbyNpc> {
        let observer = self.id_at(slot);
        self.nearby(location, radius)
            .into_iter()
            .filter(|n| &n.id != observer && n.distance < radius)
            .collect()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("npcs", &self.ids)
            .field("events", &self.event_count())
            .finish_non_exhaustive()
    }
}
