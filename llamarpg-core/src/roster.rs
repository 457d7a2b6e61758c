//! Compiled-in world data: the NPC roster and the gatherable resource table.

use serde::{Deserialize, Serialize};

use crate::types::{Activity, EntityId};

/// Static description of one NPC, used once at world setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcDefinition {
    /// Unique id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Role, e.g. "Merchant".
    pub role: String,
    /// One-sentence personality fed into decision prompts.
    #[serde(default)]
    pub personality: String,
}

impl NpcDefinition {
    /// Build a definition from string slices.
    #[must_use]
    pub fn new(id: &str, name: &str, role: &str, personality: &str) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.to_string(),
            role: role.to_string(),
            personality: personality.to_string(),
        }
    }
}

/// The five NPCs the simulation ships with.
#[must_use]
pub fn default_roster() -> Vec<NpcDefinition> {
    vec![
        NpcDefinition::new(
            "trader_joe",
            "Trader Joe",
            "Merchant",
            "Friendly and fair trader who specializes in rare resources",
        ),
        NpcDefinition::new(
            "miner_mike",
            "Miner Mike",
            "Master Miner",
            "Gruff but knowledgeable about ores, prefers to work alone",
        ),
        NpcDefinition::new(
            "woodie",
            "Woodie",
            "Lumberjack",
            "Nature-loving woodcutter who sustainably harvests trees",
        ),
        NpcDefinition::new(
            "smith_sara",
            "Smith Sara",
            "Blacksmith",
            "Skilled craftswoman always looking for quality materials",
        ),
        NpcDefinition::new(
            "wandering_will",
            "Wandering Will",
            "Explorer",
            "Adventurous soul who loves discovering new resource locations",
        ),
    ]
}

/// A gatherable resource with its proficiency requirement and experience reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Item name as it appears in inventories.
    pub name: &'static str,
    /// Proficiency level required by the player-character model.
    pub level: u32,
    /// Experience granted by the player-character model.
    pub exp: u32,
}

/// Ores that can be mined.
pub const ORES: [ResourceInfo; 3] = [
    ResourceInfo { name: "copper_ore", level: 1, exp: 10 },
    ResourceInfo { name: "iron_ore", level: 5, exp: 20 },
    ResourceInfo { name: "gold_ore", level: 10, exp: 40 },
];

/// Woods that can be cut.
pub const WOODS: [ResourceInfo; 3] = [
    ResourceInfo { name: "oak_wood", level: 1, exp: 10 },
    ResourceInfo { name: "maple_wood", level: 5, exp: 20 },
    ResourceInfo { name: "yew_wood", level: 10, exp: 40 },
];

/// Resource table for an activity. Crafting and trading gather nothing.
#[must_use]
pub fn resources_for(activity: Activity) -> &'static [ResourceInfo] {
    match activity {
        Activity::Mining => &ORES,
        Activity::Woodcutting => &WOODS,
        Activity::Crafting | Activity::Trading => &[],
    }
}

/// Look up a resource by name within an activity's table.
#[must_use]
pub fn lookup(activity: Activity, name: &str) -> Option<&'static ResourceInfo> {
    resources_for(activity).iter().find(|r| r.name == name)
}
