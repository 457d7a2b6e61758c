//! Affinity between NPCs.
//!
//! Scores are integers in `[0, 100]`. An NPC with no recorded score for
//! another starts from the configured default (50) on first interaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Upper bound of an affinity score.
pub const MAX_AFFINITY: u8 = 100;

/// Per-NPC affinity scores towards other NPCs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relationships {
    scores: BTreeMap<EntityId, u8>,
}

impl Relationships {
    /// Create an empty relationship table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the score towards `other` by `delta`, starting from `default`
    /// when no score exists yet. The result is clamped to `[0, 100]`.
    pub fn adjust(&mut self, other: &EntityId, delta: i32, default: u8) -> u8 {
        let current = self.scores.get(other).copied().unwrap_or(default);
        let next = (i32::from(current) + delta).clamp(0, i32::from(MAX_AFFINITY));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let next = next as u8;
        self.scores.insert(other.clone(), next);
        next
    }

    /// Recorded score towards `other`, if any.
    #[must_use]
    pub fn get(&self, other: &str) -> Option<u8> {
        self.scores.get(other).copied()
    }

    /// Iterate `(other, score)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, u8)> {
        self.scores.iter().map(|(k, v)| (k, *v))
    }

    /// Number of NPCs with a recorded score.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no score has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Coarse band of an affinity score, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffinityBand {
    /// 75 and above.
    Close,
    /// 50 to 74.
    Friendly,
    /// 25 to 49.
    Cool,
    /// Below 25.
    Distant,
}

impl AffinityBand {
    /// Classify a score.
    #[must_use]
    pub fn of(score: u8) -> Self {
        match score {
            75.. => Self::Close,
            50..=74 => Self::Friendly,
            25..=49 => Self::Cool,
            _ => Self::Distant,
        }
    }
}
