//! Core type definitions shared across the simulation.

use std::borrow::Borrow;
use std::fmt;

use chrono::Timelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable string key of an NPC (e.g. `"miner_mike"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Wrap an id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// Width and height of the square world.
pub const MAP_SIZE: f64 = 100.0;

/// Largest coordinate an entity may occupy.
pub const MAX_COORD: f64 = MAP_SIZE - 1.0;

/// A 2D position. Both axes stay within `[0, MAP_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Location {
    /// Create a location, clamping both axes into the map.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }.clamped()
    }

    /// Random integer position anywhere on the map.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            x: f64::from(rng.gen_range(0..100_u32)),
            y: f64::from(rng.gen_range(0..100_u32)),
        }
    }

    /// Clamp both axes into `[0, MAX_COORD]`. Non-finite axes collapse to 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, MAX_COORD) } else { 0.0 };
        Self {
            x: clamp(self.x),
            y: clamp(self.y),
        }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Floored integer grid cell.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.cell();
        write!(f, "({x}, {y})")
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Activity kinds an NPC has a specialisation multiplier for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    /// Mining ore.
    Mining,
    /// Cutting wood.
    Woodcutting,
    /// Crafting (reported only).
    Crafting,
    /// Trading (reported only).
    Trading,
}

impl Activity {
    /// All activity kinds in display order.
    pub const ALL: [Activity; 4] = [
        Self::Mining,
        Self::Woodcutting,
        Self::Crafting,
        Self::Trading,
    ];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mining => "mining",
            Self::Woodcutting => "woodcutting",
            Self::Crafting => "crafting",
            Self::Trading => "trading",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ambient world state
// ---------------------------------------------------------------------------

/// Coarse time of day fed into every decision prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 to 17:59.
    #[default]
    Day,
    /// Everything else.
    Night,
}

impl TimeOfDay {
    /// Classify a wall-clock hour (0–23).
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            Self::Day
        } else {
            Self::Night
        }
    }

    /// Time of day from the local wall clock.
    #[must_use]
    pub fn now() -> Self {
        Self::from_hour(chrono::Local::now().hour())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => f.write_str("day"),
            Self::Night => f.write_str("night"),
        }
    }
}

/// World state shared by every decision in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldContext {
    /// Current time of day.
    pub time_of_day: TimeOfDay,
}

impl WorldContext {
    /// Context derived from the local wall clock.
    #[must_use]
    pub fn now() -> Self {
        Self {
            time_of_day: TimeOfDay::now(),
        }
    }
}

/// Local wall-clock stamp used to prefix memories and event-log lines.
#[must_use]
pub fn clock_stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
