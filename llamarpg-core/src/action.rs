//! Actions an NPC can take, and validation of untrusted decision payloads.
//!
//! A [`RawDecision`] is whatever the decision source produced. It becomes
//! an [`Action`] only through [`RawDecision::validate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster;
use crate::types::{Activity, EntityId, MAP_SIZE};

/// The five action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Mine an ore.
    Mine,
    /// Cut a wood.
    Woodcut,
    /// Walk towards coordinates.
    Move,
    /// Swap surplus items with a nearby NPC.
    Trade,
    /// Talk to a nearby NPC.
    Chat,
}

impl ActionKind {
    /// All kinds in prompt order.
    pub const ALL: [ActionKind; 5] = [
        Self::Mine,
        Self::Woodcut,
        Self::Move,
        Self::Trade,
        Self::Chat,
    ];

    /// Wire name used in decision payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mine => "mine",
            Self::Woodcut => "woodcut",
            Self::Move => "move",
            Self::Trade => "trade",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = InvalidDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mine" => Ok(Self::Mine),
            "woodcut" => Ok(Self::Woodcut),
            "move" => Ok(Self::Move),
            "trade" => Ok(Self::Trade),
            "chat" => Ok(Self::Chat),
            _ => Err(InvalidDecision::UnknownAction(s.to_string())),
        }
    }
}

/// A validated action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Mine the named ore.
    Mine {
        /// Ore name, e.g. `copper_ore`.
        resource: String,
    },
    /// Cut the named wood.
    Woodcut {
        /// Wood name, e.g. `oak_wood`.
        resource: String,
    },
    /// Walk towards `(x, y)`.
    Move {
        /// Target x in `[0, 100)`.
        x: f64,
        /// Target y in `[0, 100)`.
        y: f64,
    },
    /// Trade with another NPC.
    Trade {
        /// Partner id.
        partner: EntityId,
    },
    /// Chat with another NPC.
    Chat {
        /// Partner id.
        partner: EntityId,
    },
}

impl Action {
    /// The kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Mine { .. } => ActionKind::Mine,
            Self::Woodcut { .. } => ActionKind::Woodcut,
            Self::Move { .. } => ActionKind::Move,
            Self::Trade { .. } => ActionKind::Trade,
            Self::Chat { .. } => ActionKind::Chat,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mine { resource } => write!(f, "mine {resource}"),
            Self::Woodcut { resource } => write!(f, "woodcut {resource}"),
            Self::Move { x, y } => write!(f, "move to {x},{y}"),
            Self::Trade { partner } => write!(f, "trade with {partner}"),
            Self::Chat { partner } => write!(f, "chat with {partner}"),
        }
    }
}

/// A validated action plus the stated reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// What to do.
    pub action: Action,
    /// Why, in the NPC's words.
    pub reason: String,
}

/// Why a decision payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDecision {
    /// A required field was missing or empty.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// The action is not one of the five known kinds.
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    /// The target is not a known resource for the activity.
    #[error("unknown {activity} resource `{target}`")]
    UnknownResource {
        /// Activity the target was checked against.
        activity: Activity,
        /// Rejected target.
        target: String,
    },
    /// The move target is not two comma-separated numbers in `[0, 100)`.
    #[error("invalid coordinates `{0}`")]
    InvalidCoordinates(String),
}

/// Untrusted `{action, target, reason}` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDecision {
    /// Action name.
    #[serde(default)]
    pub action: String,
    /// Resource name, `"x,y"` coordinates, or NPC id.
    #[serde(default)]
    pub target: String,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
}

impl RawDecision {
    /// Build a payload from string slices.
    #[must_use]
    pub fn new(action: &str, target: &str, reason: &str) -> Self {
        Self {
            action: action.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check every field and build the typed [`Decision`].
    ///
    /// # Errors
    /// Returns the first [`InvalidDecision`] found.
    pub fn validate(&self) -> Result<Decision, InvalidDecision> {
        let action = self.action.trim();
        let target = self.target.trim();
        let reason = self.reason.trim();
        if action.is_empty() {
            return Err(InvalidDecision::MissingField("action"));
        }
        if target.is_empty() {
            return Err(InvalidDecision::MissingField("target"));
        }
        if reason.is_empty() {
            return Err(InvalidDecision::MissingField("reason"));
        }

        let action = match action.parse::<ActionKind>()? {
            ActionKind::Mine => Action::Mine {
                resource: known_resource(Activity::Mining, target)?,
            },
            ActionKind::Woodcut => Action::Woodcut {
                resource: known_resource(Activity::Woodcutting, target)?,
            },
            ActionKind::Move => {
                let (x, y) = parse_coordinates(target)
                    .ok_or_else(|| InvalidDecision::InvalidCoordinates(target.to_string()))?;
                Action::Move { x, y }
            }
            ActionKind::Trade => Action::Trade {
                partner: EntityId::new(target),
            },
            ActionKind::Chat => Action::Chat {
                partner: EntityId::new(target),
            },
        };

        Ok(Decision {
            action,
            reason: reason.to_string(),
        })
    }
}

fn known_resource(activity: Activity, target: &str) -> Result<String, InvalidDecision> {
    roster::lookup(activity, target)
        .map(|r| r.name.to_string())
        .ok_or_else(|| InvalidDecision::UnknownResource {
            activity,
            target: target.to_string(),
        })
}

/// Parse `"x,y"` into two finite coordinates, each in `[0, 100)`.
#[must_use]
pub fn parse_coordinates(target: &str) -> Option<(f64, f64)> {
    let (x, y) = target.split_once(',')?;
    let parse = |s: &str| -> Option<f64> {
        let v: f64 = s.trim().parse().ok()?;
        (v.is_finite() && (0.0..MAP_SIZE).contains(&v)).then_some(v)
    };
    Some((parse(x)?, parse(y)?))
}
